//! Admin sign-in handlers.
//!
//! Admins sign in with their backend account. The account must carry the
//! admin role; customers are turned away even with valid credentials.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use threadline_backend::BackendError;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::SIGN_IN_PATH;
use crate::middleware::{PageContext, clear_current_admin, set_current_admin, set_flash};
use crate::models::{AdminSession, Flash};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

fn login_failure_message(err: &BackendError) -> String {
    if err.is_unauthorized() || err.is_client_error() || err.is_not_found() {
        "Invalid email or password.".to_string()
    } else {
        err.user_message()
    }
}

/// Display the sign-in page, or go straight to the dashboard when signed in.
pub async fn login_page(page: PageContext) -> Response {
    if page.is_signed_in() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate { page }.into_response()
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
        return Ok(Redirect::to(SIGN_IN_PATH));
    }

    let issued = match state.backend().login(email, &form.password).await {
        Ok(issued) => issued,
        Err(e) => {
            tracing::warn!(error = %e, "Admin login failed");
            set_flash(&session, Flash::error(login_failure_message(&e))).await;
            return Ok(Redirect::to(SIGN_IN_PATH));
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
            return Ok(Redirect::to(SIGN_IN_PATH));
        }
    };

    if !user.role.is_admin() {
        tracing::warn!(user_id = %user.user_id, "Non-admin account refused");
        set_flash(
            &session,
            Flash::error("This account does not have admin access."),
        )
        .await;
        return Ok(Redirect::to(SIGN_IN_PATH));
    }

    let admin = AdminSession::new(&user, issued.token, issued.expires_in, Utc::now());
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.user_id, Some(&admin.email));
    tracing::info!(user_id = %admin.user_id, "Admin signed in");

    set_flash(&session, Flash::success(format!("Signed in as {}.", admin.name))).await;
    Ok(Redirect::to("/"))
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success("You have been signed out.")).await;
    Ok(Redirect::to(SIGN_IN_PATH))
}
