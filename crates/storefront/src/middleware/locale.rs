//! Active UI language.
//!
//! Resolution order: the `lang` cookie, then the first tag of
//! `Accept-Language`, then the configured default.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use mercado_core::i18n::resolve_language;
use mercado_core::{Language, Translator};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use super::token::read_cookie;
use crate::state::AppState;

/// Name of the cookie holding the language preference.
pub const LANG_COOKIE: &str = "lang";

/// How long a language preference is remembered (1 year).
const LANG_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// First language tag of `Accept-Language`, e.g. `es-MX` from `es-MX,es;q=0.9`.
#[must_use]
pub fn browser_language(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or(tag).trim().to_string())
        .filter(|tag| !tag.is_empty())
}

/// Resolve the language for a request.
#[must_use]
pub fn request_language(headers: &HeaderMap, default: Language) -> Language {
    resolve_language(
        read_cookie(headers, LANG_COOKIE).as_deref(),
        browser_language(headers).as_deref(),
        default,
    )
}

/// `Set-Cookie` value storing `language`.
#[must_use]
pub fn language_cookie(language: Language, secure: bool) -> String {
    Cookie::build((LANG_COOKIE, language.code()))
        .path("/")
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(LANG_COOKIE_MAX_AGE_DAYS))
        .build()
        .to_string()
}

/// Extractor yielding a [`Translator`] bound to the request's language.
pub struct Locale(pub Translator);

impl FromRequestParts<AppState> for Locale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let language = request_language(&parts.headers, state.config().default_language);
        Ok(Self(state.translator(language)))
    }
}
