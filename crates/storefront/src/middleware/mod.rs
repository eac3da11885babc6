//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Rate limiting on auth routes (governor)
//!
//! Extractors: [`RequireToken`] / [`OptionalToken`] read the backend token
//! cookie, [`Locale`] resolves the UI language.

pub mod locale;
pub mod rate_limit;
pub mod request_id;
pub mod session;
pub mod token;

pub use locale::{LANG_COOKIE, Locale, language_cookie};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
pub use token::{
    GuardDecision, OptionalToken, RequireToken, TOKEN_COOKIE, clear_token_cookie, is_htmx,
    token_cookie,
};
