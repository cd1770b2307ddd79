//! Display preference handlers.

use axum::{Form, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::{Theme, session_keys};

/// Theme toggle form data.
#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    /// Page to go back to after toggling.
    #[serde(default)]
    pub return_to: String,
}

/// Only same-site paths are followed; anything else goes home.
#[must_use]
pub fn safe_return_path(raw: &str) -> &str {
    if raw.starts_with('/') && !raw.starts_with("//") && !raw.contains('\\') {
        raw
    } else {
        "/"
    }
}

/// Switch between the light and dark theme.
#[instrument(skip(session))]
pub async fn toggle_theme(session: Session, Form(form): Form<ThemeForm>) -> Result<Redirect> {
    let current = session
        .get::<Theme>(session_keys::THEME)
        .await?
        .unwrap_or_default();
    session.insert(session_keys::THEME, current.toggled()).await?;

    Ok(Redirect::to(safe_return_path(&form.return_to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path("/cart?page=2"), "/cart?page=2");
        assert_eq!(safe_return_path("//evil.example"), "/");
        assert_eq!(safe_return_path("https://evil.example"), "/");
        assert_eq!(safe_return_path("/\\evil.example"), "/");
        assert_eq!(safe_return_path(""), "/");
    }
}
