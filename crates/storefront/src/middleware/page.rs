//! Per-page chrome shared by every full-page template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::csp::CspNonce;
use crate::models::{CustomerSession, Flash, Theme, session_keys};

/// Signed-in customer as shown in the header.
#[derive(Debug, Clone)]
pub struct CustomerBadge {
    pub first_name: String,
    pub is_admin: bool,
}

impl From<&CustomerSession> for CustomerBadge {
    fn from(customer: &CustomerSession) -> Self {
        Self {
            first_name: customer.first_name.clone(),
            is_admin: customer.is_admin(),
        }
    }
}

/// Everything the base layout needs.
///
/// Extracting it consumes the pending flash message, so only extract it in
/// handlers that render a full page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub nonce: String,
    /// Path and query of the current request, for "return here" forms.
    pub path: String,
    pub customer: Option<CustomerBadge>,
    pub theme: Theme,
    pub flash: Option<Flash>,
}

impl PageContext {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.customer.is_some()
    }

    #[must_use]
    pub const fn theme_name(&self) -> &'static str {
        self.theme.as_str()
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CspNonce(nonce) = CspNonce::from_request_parts(parts, state).await?;
        let path = parts
            .uri
            .path_and_query()
            .map_or("/", |pq| pq.as_str())
            .to_string();

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self {
                nonce,
                path,
                ..Self::default()
            });
        };

        let customer = session
            .get::<CustomerSession>(session_keys::CUSTOMER)
            .await
            .ok()
            .flatten()
            .filter(|customer| !customer.is_expired());

        let theme = session
            .get::<Theme>(session_keys::THEME)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        let flash = session
            .remove::<Flash>(session_keys::FLASH)
            .await
            .ok()
            .flatten();

        Ok(Self {
            nonce,
            path,
            customer: customer.as_ref().map(CustomerBadge::from),
            theme,
            flash,
        })
    }
}

/// Queue a notification for the next rendered page.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!("Failed to store flash message: {e}");
    }
}
