//! Authentication extractors.
//!
//! A customer counts as signed in only while the backend token stored in the
//! session is unexpired. Expired sessions are cleared on first use.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CustomerSession, Flash, session_keys};

/// Where unauthenticated customers are sent.
pub const SIGN_IN_PATH: &str = "/auth";

/// Extractor that requires a signed-in customer.
///
/// ```rust,ignore
/// async fn orders(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
///     format!("Orders for {}", customer.email)
/// }
/// ```
pub struct RequireCustomer(pub CustomerSession);

/// Error returned when a route needs a customer and none is signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the sign-in page (full page requests).
    RedirectToLogin,
    /// Ask HTMX to navigate to the sign-in page (fragment requests).
    HtmxRedirect,
    /// No session layer is installed.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
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

/// Read the customer from the session, dropping it if the token has expired.
///
/// Returns `(customer, was_expired)`.
async fn load_customer(session: &Session) -> (Option<CustomerSession>, bool) {
    let customer = session
        .get::<CustomerSession>(session_keys::CUSTOMER)
        .await
        .ok()
        .flatten();

    match customer {
        Some(customer) if customer.is_expired() => {
            tracing::info!(user_id = %customer.user_id, "Customer token expired");
            if let Err(e) = clear_current_customer(session).await {
                tracing::warn!("Failed to clear expired customer session: {e}");
            }
            (None, true)
        }
        customer => (customer, false),
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;

        let (customer, expired) = load_customer(&session).await;
        if let Some(customer) = customer {
            return Ok(Self(customer));
        }

        let flash = if expired {
            Flash::info("Your session has expired. Please sign in again.")
        } else {
            Flash::info("Please sign in to continue.")
        };
        if let Err(e) = session.insert(session_keys::FLASH, flash).await {
            tracing::warn!("Failed to store sign-in notice: {e}");
        }

        if parts.headers.contains_key("hx-request") {
            Err(AuthRejection::HtmxRedirect)
        } else {
            Err(AuthRejection::RedirectToLogin)
        }
    }
}

/// Extractor that optionally gets the signed-in customer.
///
/// Unlike `RequireCustomer`, this never rejects the request.
pub struct OptionalCustomer(pub Option<CustomerSession>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => load_customer(session).await.0,
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the signed-in customer, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CustomerSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CUSTOMER, customer).await
}

/// Clear the signed-in customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::CUSTOMER).await?;
    session.remove_value(session_keys::PAYMENT_INTENT).await?;
    Ok(())
}
