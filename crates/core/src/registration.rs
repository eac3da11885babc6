//! The three-step registration wizard.
//!
//! ```text
//! Identity (name, email, username) -> Password (password, confirmation) -> Phone -> Ready
//! ```
//!
//! Every step requires its fields to be non-empty. The password step also
//! requires the confirmation to match. Only a completed wizard produces a
//! [`Registration`] to submit; nothing here talks to the network.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    #[default]
    Identity,
    Password,
    Phone,
}

impl RegistrationStep {
    /// 1-based step number for display.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Identity => 1,
            Self::Password => 2,
            Self::Phone => 3,
        }
    }

    #[must_use]
    pub const fn is_last(self) -> bool {
        matches!(self, Self::Phone)
    }
}

/// Fields submitted for one step.
#[derive(Clone, PartialEq, Eq)]
pub enum StepInput {
    Identity {
        name: String,
        email: String,
        username: String,
    },
    Password {
        password: String,
        confirmation: String,
    },
    Phone {
        phone: String,
    },
}

impl StepInput {
    const fn step(&self) -> RegistrationStep {
        match self {
            Self::Identity { .. } => RegistrationStep::Identity,
            Self::Password { .. } => RegistrationStep::Password,
            Self::Phone { .. } => RegistrationStep::Phone,
        }
    }
}

impl fmt::Debug for StepInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity {
                name,
                email,
                username,
            } => f
                .debug_struct("Identity")
                .field("name", name)
                .field("email", email)
                .field("username", username)
                .finish(),
            Self::Password { .. } => f
                .debug_struct("Password")
                .field("password", &"[REDACTED]")
                .field("confirmation", &"[REDACTED]")
                .finish(),
            Self::Phone { phone } => f.debug_struct("Phone").field("phone", phone).finish(),
        }
    }
}

/// Why a step could not advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A required field was empty.
    #[error("all fields are required")]
    IncompleteFields,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Input for a different step than the current one.
    #[error("expected input for step {expected:?}, got {got:?}")]
    WrongStep {
        expected: RegistrationStep,
        got: RegistrationStep,
    },
}

impl RegistrationError {
    /// Translation key for the user-facing message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::IncompleteFields | Self::WrongStep { .. } => "register.completeFields",
            Self::PasswordMismatch => "register.passwordMismatch",
        }
    }
}

/// Result of a successful step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Move on to the given step.
    Next(RegistrationStep),
    /// All steps complete; submit this.
    Ready(Registration),
}

/// Signup request body.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .finish()
    }
}

/// Wizard state: current step plus the fields collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationWizard {
    step: RegistrationStep,
    draft: Registration,
}

impl RegistrationWizard {
    /// A wizard at step 1 with nothing filled in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> RegistrationStep {
        self.step
    }

    /// Fields collected so far.
    #[must_use]
    pub const fn draft(&self) -> &Registration {
        &self.draft
    }

    /// Apply one step's input.
    ///
    /// On success the wizard moves forward (or, on the last step, stays put and
    /// returns the complete registration so a failed submission can be
    /// retried). On error the wizard does not move.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if a field is blank, the passwords differ,
    /// or the input belongs to another step.
    pub fn submit(&mut self, input: StepInput) -> Result<StepOutcome, RegistrationError> {
        if input.step() != self.step {
            return Err(RegistrationError::WrongStep {
                expected: self.step,
                got: input.step(),
            });
        }

        match input {
            StepInput::Identity {
                name,
                email,
                username,
            } => {
                require_filled(&[&name, &email, &username])?;
                self.draft.name = name;
                self.draft.email = email;
                self.draft.username = username;
                self.step = RegistrationStep::Password;
                Ok(StepOutcome::Next(self.step))
            }
            StepInput::Password {
                password,
                confirmation,
            } => {
                require_filled(&[&password, &confirmation])?;
                if password != confirmation {
                    return Err(RegistrationError::PasswordMismatch);
                }
                self.draft.password = password;
                self.step = RegistrationStep::Phone;
                Ok(StepOutcome::Next(self.step))
            }
            StepInput::Phone { phone } => {
                require_filled(&[&phone])?;
                self.draft.phone = phone;
                Ok(StepOutcome::Ready(self.draft.clone()))
            }
        }
    }
}

fn require_filled(fields: &[&str]) -> Result<(), RegistrationError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(RegistrationError::IncompleteFields);
    }
    Ok(())
}
