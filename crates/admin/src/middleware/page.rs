//! Per-page chrome shared by every full-page template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::auth::load_admin;
use super::csp::CspNonce;
use crate::models::{AdminSession, Flash, session_keys};

/// Signed-in admin as shown in the top bar.
#[derive(Debug, Clone)]
pub struct AdminBadge {
    pub name: String,
    pub email: String,
}

impl From<&AdminSession> for AdminBadge {
    fn from(admin: &AdminSession) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
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
    pub path: String,
    pub admin: Option<AdminBadge>,
    pub flash: Option<Flash>,
}

impl PageContext {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.admin.is_some()
    }

    /// Whether a nav link should be highlighted.
    #[must_use]
    pub fn is_section(&self, prefix: &str) -> bool {
        self.path == prefix
            || self.path.starts_with(&format!("{prefix}/"))
            || self.path.starts_with(&format!("{prefix}?"))
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

        let (admin, _) = load_admin(&session).await;

        let flash = session
            .remove::<Flash>(session_keys::FLASH)
            .await
            .ok()
            .flatten();

        Ok(Self {
            nonce,
            path,
            admin: admin.as_ref().map(AdminBadge::from),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_section() {
        let page = PageContext {
            path: "/products/p1/edit".to_string(),
            ..PageContext::default()
        };
        assert!(page.is_section("/products"));
        assert!(!page.is_section("/palette"));

        let page = PageContext {
            path: "/categories?q=coat".to_string(),
            ..PageContext::default()
        };
        assert!(page.is_section("/categories"));
    }
}
