//! Authentication route handlers.
//!
//! One page switches between sign-in and registration. Signing in exchanges
//! credentials for a backend bearer token, which is kept only in the
//! server-side session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use threadline_backend::{BackendError, RegisterRequest};
use threadline_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{PageContext, clear_current_customer, set_current_customer, set_flash};
use crate::models::{CustomerSession, Flash};
use crate::state::AppState;

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// `?mode=register` opens the registration form.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    pub mode: Option<String>,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Registration fields echoed back after a failed attempt. Passwords are
/// never echoed.
#[derive(Debug, Clone, Default)]
pub struct RegisterValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&RegisterForm> for RegisterValues {
    fn from(form: &RegisterForm) -> Self {
        Self {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in / registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub page: PageContext,
    pub register_mode: bool,
    pub errors: Vec<String>,
    pub values: RegisterValues,
}

// =============================================================================
// Validation
// =============================================================================

/// Check a registration form, returning every problem found.
#[must_use]
pub fn validate_registration(form: &RegisterForm) -> Vec<String> {
    let mut errors = Vec::new();

    if form.first_name.trim().chars().count() < MIN_NAME_CHARS {
        errors.push(format!(
            "First name must be at least {MIN_NAME_CHARS} characters."
        ));
    }
    if form.last_name.trim().chars().count() < MIN_NAME_CHARS {
        errors.push(format!(
            "Last name must be at least {MIN_NAME_CHARS} characters."
        ));
    }
    if let Err(e) = Email::parse(&form.email) {
        errors.push(format!("Please enter a valid email address ({e})."));
    }
    if form.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters."
        ));
    }
    if form.password != form.password_confirm {
        errors.push("Passwords do not match.".to_string());
    }

    errors
}

/// Customer-facing message for a failed sign-in.
fn login_failure_message(err: &BackendError) -> String {
    if err.is_unauthorized() || err.is_client_error() || err.is_not_found() {
        "Invalid email or password.".to_string()
    } else {
        err.user_message()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sign-in / registration page.
pub async fn page(page: PageContext, Query(query): Query<AuthQuery>) -> AuthTemplate {
    AuthTemplate {
        page,
        register_mode: query.mode.as_deref() == Some("register"),
        errors: Vec::new(),
        values: RegisterValues::default(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        set_flash(&session, Flash::error("Enter your email and password.")).await;
        return Ok(Redirect::to("/auth"));
    }

    let issued = match state.backend().login(email, &form.password).await {
        Ok(issued) => issued,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            set_flash(&session, Flash::error(login_failure_message(&e))).await;
            return Ok(Redirect::to("/auth"));
        }
    };

    let user = match state
        .backend()
        .authorized(&issued.token)
        .get_user_by_email(email)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch account after login");
            set_flash(&session, Flash::error(e.user_message())).await;
            return Ok(Redirect::to("/auth"));
        }
    };

    let customer = CustomerSession::new(&user, issued.token, issued.expires_in, Utc::now());
    set_current_customer(&session, &customer).await?;
    set_sentry_user(&customer.user_id, Some(&customer.email));
    tracing::info!(user_id = %customer.user_id, "Customer signed in");

    set_flash(
        &session,
        Flash::success(format!("Welcome back, {}!", customer.first_name)),
    )
    .await;
    Ok(Redirect::to("/"))
}

/// Handle registration form submission.
///
/// On success the customer is asked to verify their email and sign in; the
/// verification email and the new cart are best effort.
#[instrument(skip(state, session, page, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<RegisterForm>,
) -> Response {
    let rerender = |page: PageContext, errors: Vec<String>| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            AuthTemplate {
                page,
                register_mode: true,
                errors,
                values: RegisterValues::from(&form),
            },
        )
            .into_response()
    };

    let errors = validate_registration(&form);
    if !errors.is_empty() {
        return rerender(page, errors);
    }

    let request = RegisterRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
    };

    let user = match state.backend().register(&request).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            return rerender(page, vec![e.user_message()]);
        }
    };

    if let Err(e) = state.backend().send_verification_email(&user.email).await {
        tracing::warn!(error = %e, user_id = %user.user_id, "Failed to send verification email");
    }
    if let Err(e) = state.backend().create_cart(&user.user_id).await {
        tracing::warn!(error = %e, user_id = %user.user_id, "Failed to create cart");
    }

    tracing::info!(user_id = %user.user_id, "Customer registered");
    set_flash(
        &session,
        Flash::success("Account created. Check your email to verify your address, then sign in."),
    )
    .await;
    Redirect::to("/auth").into_response()
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, last: &str, email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let errors = validate_registration(&form("Ada", "Lo", "ada@example.com", "secret", "secret"));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_short_names_rejected() {
        let errors = validate_registration(&form("A", " B ", "ada@example.com", "secret", "secret"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_bad_email_rejected() {
        let errors = validate_registration(&form("Ada", "Lovelace", "ada.example.com", "secret", "secret"));
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().all(|e| e.contains("email")));
    }

    #[test]
    fn test_password_rules() {
        let errors = validate_registration(&form("Ada", "Lovelace", "ada@example.com", "12345", "12345"));
        assert_eq!(errors, vec!["Password must be at least 6 characters."]);

        let errors = validate_registration(&form("Ada", "Lovelace", "ada@example.com", "123456", "123457"));
        assert_eq!(errors, vec!["Passwords do not match."]);
    }

    #[test]
    fn test_debug_hides_passwords() {
        let rendered = format!("{:?}", form("Ada", "Lovelace", "ada@example.com", "hunter22", "hunter22"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn test_login_failure_message_hides_backend_detail() {
        let err = BackendError::Status {
            status: 400,
            message: "User ada@example.com has no password".to_string(),
        };
        assert_eq!(login_failure_message(&err), "Invalid email or password.");
        assert_eq!(
            login_failure_message(&BackendError::Status {
                status: 503,
                message: String::new()
            }),
            "Something went wrong. Please try again."
        );
    }
}
