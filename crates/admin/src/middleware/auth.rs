//! Authentication extractors for admin.
//!
//! An admin counts as signed in only while the session holds an unexpired
//! backend token issued to a user with the admin role.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::models::{AdminSession, Flash, session_keys};

/// Where unauthenticated requests are sent.
pub const SIGN_IN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in admin.
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub AdminSession);

/// Error returned when a route needs an admin and none is signed in.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (full page requests).
    RedirectToLogin,
    /// Ask HTMX to navigate to the login page (fragment requests).
    HtmxRedirect,
    /// No session layer is installed.
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(SIGN_IN_PATH).into_response(),
            Self::HtmxRedirect => {
                let mut response = StatusCode::OK.into_response();
                response
                    .headers_mut()
                    .insert("hx-redirect", HeaderValue::from_static(SIGN_IN_PATH));
                response
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read the admin from the session, dropping it if it no longer grants access.
///
/// Returns `(admin, was_dropped)`.
pub(crate) async fn load_admin(session: &Session) -> (Option<AdminSession>, bool) {
    let admin = session
        .get::<AdminSession>(session_keys::ADMIN)
        .await
        .ok()
        .flatten();

    match admin {
        Some(admin) if !admin.grants_access_at(Utc::now()) => {
            tracing::info!(user_id = %admin.user_id, "Admin session no longer valid");
            if let Err(e) = clear_current_admin(session).await {
                tracing::warn!("Failed to clear stale admin session: {e}");
            }
            (None, true)
        }
        admin => (admin, false),
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let (admin, dropped) = load_admin(&session).await;
        if let Some(admin) = admin {
            return Ok(Self(admin));
        }

        let flash = if dropped {
            Flash::error("Your session has expired. Please sign in again.")
        } else {
            Flash::error("Please sign in to continue.")
        };
        if let Err(e) = session.insert(session_keys::FLASH, flash).await {
            tracing::warn!("Failed to store sign-in notice: {e}");
        }

        if parts.headers.contains_key("hx-request") {
            Err(AdminAuthRejection::HtmxRedirect)
        } else {
            Err(AdminAuthRejection::RedirectToLogin)
        }
    }
}

/// Store the signed-in admin, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &AdminSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::ADMIN, admin).await
}

/// Clear the signed-in admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::ADMIN).await?;
    Ok(())
}
