//! Backend token cookie and the session guard.
//!
//! The token issued by the backend at login is kept in the `token` cookie.
//! Its presence is the only authorization signal; nothing here inspects or
//! expires it.
//!
//! Guarded pages are gated twice: [`RequireToken`] redirects on load, and
//! the page polls `/session/check` so that a logout in another tab (or a
//! cleared cookie) sends it back to the login screen.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::cookie::{Cookie, SameSite};

use crate::api::SessionToken;
use crate::state::AppState;

/// Name of the cookie holding the backend token.
pub const TOKEN_COOKIE: &str = "token";

/// HTMX response header that makes the client navigate.
pub const HX_REDIRECT: &str = "hx-redirect";

/// HTMX request header present on every HTMX-issued request.
pub const HX_REQUEST: &str = "hx-request";

// =============================================================================
// Cookie Helpers
// =============================================================================

/// Value of the cookie `name` from the `Cookie` request headers.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// The token from the request cookies, if present and non-blank.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    read_cookie(headers, TOKEN_COOKIE).and_then(SessionToken::new)
}

/// `Set-Cookie` value storing `token`.
#[must_use]
pub fn token_cookie(token: &SessionToken, secure: bool) -> String {
    Cookie::build((TOKEN_COOKIE, token.expose().to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

/// `Set-Cookie` value that removes the token.
#[must_use]
pub fn clear_token_cookie(secure: bool) -> String {
    let mut cookie = Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie.to_string()
}

/// Whether the request came from HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST)
}

// =============================================================================
// Guard
// =============================================================================

/// What the guard does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// A token is present; carry on.
    Allow,
    /// No token; send the visitor to this path.
    Redirect(String),
}

impl GuardDecision {
    /// Decide from the presence of a token.
    #[must_use]
    pub fn for_token(token: Option<&SessionToken>, redirect_to: &str) -> Self {
        match token {
            Some(_) => Self::Allow,
            None => Self::Redirect(redirect_to.to_string()),
        }
    }

    /// Response for a poll: `204` to keep going, otherwise a redirect that
    /// HTMX follows (`HX-Redirect`) or a plain `303` for other callers.
    #[must_use]
    pub fn into_poll_response(self, htmx: bool) -> Response {
        match self {
            Self::Allow => StatusCode::NO_CONTENT.into_response(),
            Self::Redirect(to) => GuardRedirect { to, htmx }.into_response(),
        }
    }
}

/// Rejection sending a signed-out visitor away.
#[derive(Debug)]
pub struct GuardRedirect {
    to: String,
    htmx: bool,
}

impl IntoResponse for GuardRedirect {
    fn into_response(self) -> Response {
        if self.htmx {
            match HeaderValue::from_str(&self.to) {
                Ok(location) => {
                    let mut response = StatusCode::NO_CONTENT.into_response();
                    response.headers_mut().insert(HX_REDIRECT, location);
                    response
                }
                Err(_) => StatusCode::UNAUTHORIZED.into_response(),
            }
        } else {
            Redirect::to(&self.to).into_response()
        }
    }
}

/// Extractor that requires the token cookie.
///
/// Without it the request is redirected to the configured signed-out route.
///
/// # Example
///
/// ```rust,ignore
/// async fn home(RequireToken(token): RequireToken) -> impl IntoResponse {
///     // token is present
/// }
/// ```
pub struct RequireToken(pub SessionToken);

impl FromRequestParts<AppState> for RequireToken {
    type Rejection = GuardRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match token_from_headers(&parts.headers) {
            Some(token) => Ok(Self(token)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "no token, redirecting");
                Err(GuardRedirect {
                    to: state.config().guard.redirect_to.clone(),
                    htmx: is_htmx(&parts.headers),
                })
            }
        }
    }
}

/// Extractor that reads the token cookie if present.
pub struct OptionalToken(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for OptionalToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(token_from_headers(&parts.headers)))
    }
}
