//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MERCADO_BASE_URL` - Public URL for the storefront (decides `Secure` cookies)
//! - `MERCADO_API_URL` - Base URL of the backend API (e.g., <http://127.0.0.1:7000>)
//!
//! ## Optional
//! - `MERCADO_HOST` - Bind address (default: 127.0.0.1)
//! - `MERCADO_PORT` - Listen port (default: 3000)
//! - `MERCADO_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `MERCADO_SESSION_POLL_MS` - Session guard poll interval, `0` disables (default: 2000)
//! - `MERCADO_SESSION_REDIRECT` - Where the guard sends signed-out visitors (default: /)
//! - `MERCADO_DEFAULT_LANGUAGE` - Fallback UI language (default: en)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use mercado_core::Language;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend API configuration
    pub api: BackendApiConfig,
    /// Session guard configuration
    pub guard: SessionGuardConfig,
    /// Language used when neither a stored preference nor the browser locale applies
    pub default_language: Language,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct BackendApiConfig {
    /// Base URL, e.g. `http://127.0.0.1:7000`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Session guard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGuardConfig {
    /// Poll interval for guarded pages; `None` disables polling.
    pub poll_interval: Option<Duration>,
    /// Path signed-out visitors are sent to.
    pub redirect_to: String,
}

impl Default for SessionGuardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Some(Duration::from_millis(2000)),
            redirect_to: "/".to_string(),
        }
    }
}

impl SessionGuardConfig {
    /// Poll interval in whole milliseconds, for the HTMX trigger.
    #[must_use]
    pub fn poll_millis(&self) -> Option<u128> {
        self.poll_interval.map(|interval| interval.as_millis())
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("MERCADO_HOST", "127.0.0.1")?;
        let port = parse_env("MERCADO_PORT", "3000")?;
        let base_url = get_required_env("MERCADO_BASE_URL")?;
        let api = BackendApiConfig::from_env()?;
        let guard = SessionGuardConfig::from_env()?;
        let default_language = parse_language(
            "MERCADO_DEFAULT_LANGUAGE",
            &get_env_or_default("MERCADO_DEFAULT_LANGUAGE", "en"),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            guard,
            default_language,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_api_url("MERCADO_API_URL", &get_required_env("MERCADO_API_URL")?)?;
        let timeout_secs: u64 = parse_env("MERCADO_API_TIMEOUT_SECS", "10")?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SessionGuardConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let poll_ms: u64 = parse_env("MERCADO_SESSION_POLL_MS", "2000")?;
        let redirect_to = get_env_or_default("MERCADO_SESSION_REDIRECT", "/");
        if !redirect_to.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                "MERCADO_SESSION_REDIRECT".to_string(),
                "must be a local path starting with '/'".to_string(),
            ));
        }
        Ok(Self {
            poll_interval: (poll_ms > 0).then(|| Duration::from_millis(poll_ms)),
            redirect_to,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and validate the backend base URL.
fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }
    Ok(url)
}

/// Parse a supported language code.
fn parse_language(key: &str, value: &str) -> Result<Language, ConfigError> {
    Language::from_code(value).ok_or_else(|| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("unsupported language '{value}'"))
    })
}
