//! Language switch.
//!
//! Stores the choice in the `lang` cookie. HTMX callers get `HX-Refresh` so
//! the current page re-renders in the new language; plain form posts are
//! redirected back to where they came from.

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::HX_REFRESH;
use crate::middleware::{Locale, is_htmx, language_cookie};
use crate::state::AppState;

/// Language selector form data.
#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub lang: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Only same-site absolute paths are followed.
fn safe_return_path(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Switch the UI language.
///
/// Unsupported codes leave the current language unchanged.
#[instrument(skip_all, fields(lang = %form.lang))]
pub async fn switch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Locale(mut t): Locale,
    Form(form): Form<LanguageForm>,
) -> Response {
    let back = safe_return_path(form.return_to.as_deref());

    if !t.set_language(&form.lang) {
        tracing::debug!("unsupported language ignored");
        return if is_htmx(&headers) {
            StatusCode::NO_CONTENT.into_response()
        } else {
            Redirect::to(back).into_response()
        };
    }

    let cookie = language_cookie(t.language(), state.config().secure_cookies());
    if is_htmx(&headers) {
        (
            StatusCode::NO_CONTENT,
            AppendHeaders([
                (header::SET_COOKIE, cookie),
                (HeaderName::from_static(HX_REFRESH), "true".to_string()),
            ]),
        )
            .into_response()
    } else {
        (AppendHeaders([(header::SET_COOKIE, cookie)]), Redirect::to(back)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/home")), "/home");
        assert_eq!(safe_return_path(Some("/?mode=register")), "/?mode=register");
        assert_eq!(safe_return_path(Some("//evil.example")), "/");
        assert_eq!(safe_return_path(Some("https://evil.example")), "/");
        assert_eq!(safe_return_path(None), "/");
    }
}
