//! Session guard poll.
//!
//! Guarded pages call this on an interval. It answers `204` while the token
//! cookie is present and redirects to the signed-out page once it is gone.

use axum::{extract::State, http::HeaderMap, response::Response};

use crate::middleware::{GuardDecision, OptionalToken, is_htmx};
use crate::state::AppState;

/// Check whether the visitor still holds a token.
pub async fn check(
    State(state): State<AppState>,
    OptionalToken(token): OptionalToken,
    headers: HeaderMap,
) -> Response {
    let decision = GuardDecision::for_token(token.as_ref(), &state.config().guard.redirect_to);
    if decision != GuardDecision::Allow {
        tracing::debug!("session guard redirecting");
    }
    decision.into_poll_response(is_htmx(&headers))
}
