//! Authentication service.
//!
//! Login exchanges credentials for a backend token. Registration walks the
//! [`RegistrationWizard`] one step at a time and calls the backend only once
//! the last step validates.

use mercado_core::{
    RegistrationError, RegistrationStep, RegistrationWizard, StepInput, StepOutcome, Translator,
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::describe_api_error;
use crate::api::{ApiError, LoginCredentials, SessionToken, StoreApi};

// =============================================================================
// Login
// =============================================================================

/// Errors that can occur during login.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Username or password left blank; nothing was sent.
    #[error("username and password are required")]
    IncompleteFields,

    /// The backend refused or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LoginError {
    /// Message for the login form.
    #[must_use]
    pub fn user_message(&self, t: &Translator) -> String {
        match self {
            Self::IncompleteFields => t.text("login.completeFields").to_string(),
            Self::Api(err) => describe_api_error(err, t, "login.error"),
        }
    }
}

/// Exchange credentials for a session token.
///
/// # Errors
///
/// Returns `LoginError::IncompleteFields` for blank input, or
/// `LoginError::Api` when the backend rejects the credentials.
#[instrument(skip(api, password))]
pub async fn login<A: StoreApi>(
    api: &A,
    username: &str,
    password: SecretString,
) -> Result<SessionToken, LoginError> {
    let username = username.trim();
    if username.is_empty() || password.expose_secret().is_empty() {
        return Err(LoginError::IncompleteFields);
    }

    let credentials = LoginCredentials {
        username: username.to_string(),
        password,
    };
    let token = api.login(&credentials).await.inspect_err(|err| {
        warn!(error = %err, "login failed");
    })?;

    info!("login succeeded");
    Ok(token)
}

// =============================================================================
// Registration
// =============================================================================

/// Errors that can occur while advancing the registration wizard.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The step's input did not validate; the wizard did not move.
    #[error(transparent)]
    Step(#[from] RegistrationError),

    /// The signup call failed; the wizard stays on the last step.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RegisterError {
    /// Message for the registration form.
    #[must_use]
    pub fn user_message(&self, t: &Translator) -> String {
        match self {
            Self::Step(err) => t.text(err.message_key()).to_string(),
            Self::Api(err) => describe_api_error(err, t, "register.error"),
        }
    }
}

/// Result of one wizard submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Show the given step next.
    Continue(RegistrationStep),
    /// The backend created the account.
    Registered { message: Option<String> },
}

/// Apply `input` to the wizard, calling signup once every step is complete.
///
/// # Errors
///
/// Returns `RegisterError::Step` when the input is invalid (no backend call)
/// or `RegisterError::Api` when signup fails.
#[instrument(skip(api, wizard, input), fields(step = ?wizard.step()))]
pub async fn advance_registration<A: StoreApi>(
    api: &A,
    wizard: &mut RegistrationWizard,
    input: StepInput,
) -> Result<RegisterOutcome, RegisterError> {
    match wizard.submit(input)? {
        StepOutcome::Next(step) => Ok(RegisterOutcome::Continue(step)),
        StepOutcome::Ready(registration) => {
            let reply = api.signup(&registration).await.inspect_err(|err| {
                warn!(error = %err, "signup failed");
            })?;
            info!(username = %registration.username, "account registered");
            Ok(RegisterOutcome::Registered {
                message: reply.message.filter(|message| !message.trim().is_empty()),
            })
        }
    }
}
