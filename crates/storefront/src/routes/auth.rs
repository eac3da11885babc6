//! Authentication route handlers.
//!
//! Login and registration share the signed-out page at `/`. HTMX swaps the
//! `#auth-form` container in place; without HTMX every action re-renders
//! the whole page.
//!
//! The wizard position lives in the session between steps only. Loading
//! either view starts it over, so a reload always lands on step 1 and
//! collected fields never outlive an abandoned attempt.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use mercado_core::{RegistrationStep, RegistrationWizard, StepInput, Translator};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Layout, navigate};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{Locale, clear_token_cookie, is_htmx, token_cookie};
use crate::models::session::{clear_registration, registration, store_registration};
use crate::services::auth::{self as auth_service, RegisterError, RegisterOutcome};
use crate::state::AppState;

/// Where a successful login lands.
const AFTER_LOGIN: &str = "/home";

/// Where logout lands.
const AFTER_LOGOUT: &str = "/";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
///
/// Not `Debug`: it carries the password.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// One registration step. Only the fields of the posted step are read.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub step: RegistrationStep,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub phone: String,
}

impl From<RegisterForm> for StepInput {
    fn from(form: RegisterForm) -> Self {
        match form.step {
            RegistrationStep::Identity => Self::Identity {
                name: form.name,
                email: form.email,
                username: form.username,
            },
            RegistrationStep::Password => Self::Password {
                password: form.password,
                confirmation: form.confirm_password,
            },
            RegistrationStep::Phone => Self::Phone { phone: form.phone },
        }
    }
}

/// Query for the signed-out page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub mode: Option<String>,
}

// =============================================================================
// Views
// =============================================================================

/// Login form contents.
#[derive(Debug, Clone, Default)]
pub struct LoginFormView {
    pub username: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Registration form contents for the wizard's current step.
#[derive(Debug, Clone)]
pub struct RegisterFormView {
    /// 1-based step number.
    pub step: u8,
    /// Value of the hidden `step` field.
    pub step_code: &'static str,
    pub subtitle: String,
    pub is_last: bool,
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub error: Option<String>,
}

impl RegisterFormView {
    /// Prefilled from the wizard draft. Passwords are never echoed back.
    #[must_use]
    pub fn new(wizard: &RegistrationWizard, t: &Translator, error: Option<String>) -> Self {
        let step = wizard.step();
        let draft = wizard.draft();
        Self {
            step: step.number(),
            step_code: step_code(step),
            subtitle: t.format("register.subtitle", &[("step", &step.number().to_string())]),
            is_last: step.is_last(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            username: draft.username.clone(),
            phone: draft.phone.clone(),
            error,
        }
    }
}

const fn step_code(step: RegistrationStep) -> &'static str {
    match step {
        RegistrationStep::Identity => "identity",
        RegistrationStep::Password => "password",
        RegistrationStep::Phone => "phone",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Signed-out page showing the login form.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub t: Translator,
    pub layout: Layout,
    pub form: LoginFormView,
}

/// Login form fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/login_form.html")]
pub struct LoginFormTemplate {
    pub t: Translator,
    pub form: LoginFormView,
}

/// Signed-out page showing the registration wizard.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub t: Translator,
    pub layout: Layout,
    pub form: RegisterFormView,
}

/// Registration form fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/register_form.html")]
pub struct RegisterFormTemplate {
    pub t: Translator,
    pub form: RegisterFormView,
}

fn render_login(t: Translator, form: LoginFormView, htmx: bool) -> Response {
    if htmx {
        LoginFormTemplate { t, form }.into_response()
    } else {
        IndexTemplate {
            layout: Layout::new(t.language(), "/"),
            t,
            form,
        }
        .into_response()
    }
}

fn render_register(t: Translator, form: RegisterFormView, htmx: bool) -> Response {
    if htmx {
        RegisterFormTemplate { t, form }.into_response()
    } else {
        RegisterTemplate {
            layout: Layout::new(t.language(), "/?mode=register"),
            t,
            form,
        }
        .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the signed-out page: login by default, the wizard at step 1 with
/// `?mode=register`.
#[instrument(skip_all, fields(mode = ?query.mode))]
pub async fn index(
    session: Session,
    Locale(t): Locale,
    Query(query): Query<IndexQuery>,
) -> Result<Response> {
    clear_registration(&session).await?;

    if query.mode.as_deref() == Some("register") {
        let form = RegisterFormView::new(&RegistrationWizard::new(), &t, None);
        return Ok(render_register(t, form, false));
    }

    Ok(render_login(t, LoginFormView::default(), false))
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Locale(t): Locale,
    Form(form): Form<LoginForm>,
) -> Response {
    let htmx = is_htmx(&headers);
    let password = SecretString::from(form.password);

    match auth_service::login(state.api(), &form.username, password).await {
        Ok(token) => {
            set_sentry_user(form.username.trim());
            let cookie = token_cookie(&token, state.config().secure_cookies());
            (
                AppendHeaders([(header::SET_COOKIE, cookie)]),
                navigate(AFTER_LOGIN, htmx),
            )
                .into_response()
        }
        Err(e) => {
            let view = LoginFormView {
                error: Some(e.user_message(&t)),
                username: form.username,
                success: None,
            };
            render_login(t, view, htmx)
        }
    }
}

/// Handle one registration step.
#[instrument(skip_all, fields(step = ?form.step))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Locale(t): Locale,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let htmx = is_htmx(&headers);
    let mut wizard = registration(&session).await?;

    match auth_service::advance_registration(state.api(), &mut wizard, form.into()).await {
        Ok(RegisterOutcome::Continue(_)) => {
            store_registration(&session, &wizard).await?;
            let view = RegisterFormView::new(&wizard, &t, None);
            Ok(render_register(t, view, htmx))
        }
        Ok(RegisterOutcome::Registered { message }) => {
            clear_registration(&session).await?;
            let view = LoginFormView {
                username: wizard.draft().username.clone(),
                error: None,
                success: Some(message.unwrap_or_else(|| t.text("register.success").to_string())),
            };
            Ok(render_login(t, view, htmx))
        }
        Err(e) => {
            // A failed signup keeps the collected fields for a retry
            if matches!(e, RegisterError::Api(_)) {
                store_registration(&session, &wizard).await?;
            }
            let view = RegisterFormView::new(&wizard, &t, Some(e.user_message(&t)));
            Ok(render_register(t, view, htmx))
        }
    }
}

/// Handle logout.
///
/// Only the token is dropped; the cart stays with the browser session.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    clear_sentry_user();
    tracing::info!("logged out");
    (
        AppendHeaders([(
            header::SET_COOKIE,
            clear_token_cookie(state.config().secure_cookies()),
        )]),
        navigate(AFTER_LOGOUT, is_htmx(&headers)),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use mercado_core::Language;

    use super::*;
    use crate::i18n::load_catalog;

    fn translator() -> Translator {
        Translator::new(Arc::new(load_catalog().unwrap()), Language::En)
    }

    fn form(step: RegistrationStep) -> RegisterForm {
        RegisterForm {
            step,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            username: "ana".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw2".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn test_step_input_reads_only_posted_step() {
        assert_eq!(
            StepInput::from(form(RegistrationStep::Password)),
            StepInput::Password {
                password: "pw".to_string(),
                confirmation: "pw2".to_string(),
            }
        );
        assert_eq!(
            StepInput::from(form(RegistrationStep::Phone)),
            StepInput::Phone {
                phone: "555-0100".to_string()
            }
        );
    }

    #[test]
    fn test_register_view_prefills_draft() {
        let t = translator();
        let mut wizard = RegistrationWizard::new();
        wizard.submit(form(RegistrationStep::Identity).into()).unwrap();

        let view = RegisterFormView::new(&wizard, &t, None);
        assert_eq!(view.step, 2);
        assert_eq!(view.step_code, "password");
        assert_eq!(view.subtitle, "Step 2 of 3");
        assert!(!view.is_last);
        assert_eq!(view.username, "ana");
    }

    #[test]
    fn test_step_code_round_trips_through_form() {
        for step in [
            RegistrationStep::Identity,
            RegistrationStep::Password,
            RegistrationStep::Phone,
        ] {
            let parsed: RegistrationStep =
                serde_json::from_value(serde_json::Value::String(step_code(step).to_string()))
                    .unwrap();
            assert_eq!(parsed, step);
        }
    }

    #[test]
    fn test_login_fragment_renders_error_and_username() {
        let html = LoginFormTemplate {
            t: translator(),
            form: LoginFormView {
                username: "ana".to_string(),
                error: Some("Invalid credentials".to_string()),
                success: None,
            },
        }
        .render()
        .unwrap();
        assert!(html.contains("id=\"auth-form\""));
        assert!(html.contains("value=\"ana\""));
        assert!(html.contains("Invalid credentials"));
    }

    #[test]
    fn test_register_fragment_last_step_button() {
        let t = translator();
        let mut wizard = RegistrationWizard::new();
        wizard.submit(form(RegistrationStep::Identity).into()).unwrap();
        wizard
            .submit(StepInput::Password {
                password: "pw".to_string(),
                confirmation: "pw".to_string(),
            })
            .unwrap();

        let form = RegisterFormView::new(&wizard, &t, None);
        let html = RegisterFormTemplate { t, form }.render().unwrap();
        assert!(html.contains("name=\"phone\""));
        assert!(html.contains("value=\"phone\""));
        assert!(html.contains("Register"));
        assert!(!html.contains("name=\"password\""));
    }
}
