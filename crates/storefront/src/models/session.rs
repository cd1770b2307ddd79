//! Session-related types.
//!
//! Types stored in the session for authentication state and page chrome.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use threadline_core::models::User;
use threadline_core::{UserId, UserRole};

/// Session-stored customer identity.
///
/// Holds the backend bearer token, so it is never rendered or logged.
#[derive(Clone, Serialize, Deserialize)]
pub struct CustomerSession {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub role: UserRole,
    token: String,
    pub expires_at: DateTime<Utc>,
}

impl CustomerSession {
    /// Build the session record for a freshly issued token.
    #[must_use]
    pub fn new(user: &User, token: String, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            role: user.role,
            token,
            expires_at: now + Duration::seconds(expires_in_secs.max(0)),
        }
    }

    /// Bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl std::fmt::Debug for CustomerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Severity of a one-shot notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    /// CSS modifier used by the notification banner.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Error => "flash-error",
        }
    }
}

/// Notification shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Value for the `data-theme` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Payment intent issued for the cart the customer is checking out.
///
/// Lets the completion step confirm that the reported intent is the one this
/// session was given, for the amount it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub intent_id: String,
    pub amount_cents: i64,
}

/// Session keys.
pub mod keys {
    /// Logged-in customer.
    pub const CUSTOMER: &str = "customer";

    /// Pending one-shot notification.
    pub const FLASH: &str = "flash";

    /// Set after a successful checkout, consumed by the next cart render.
    pub const CHECKOUT_COMPLETE: &str = "checkout_complete";

    /// Payment intent created for the current checkout attempt.
    pub const PAYMENT_INTENT: &str = "payment_intent";

    /// Color scheme preference.
    pub const THEME: &str = "theme";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "userId": "u-1",
            "email": "jdoe@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "createdAt": "2024-05-01T10:00:00Z",
            "isEmailVerified": true,
            "role": "customer"
        }))
        .expect("valid user json")
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = CustomerSession::new(&user(), "tok".to_string(), 3600, now);

        assert!(!session.is_expired_at(now));
        assert!(!session.is_expired_at(now + Duration::seconds(3599)));
        assert!(session.is_expired_at(now + Duration::seconds(3600)));
    }

    #[test]
    fn test_negative_lifetime_is_already_expired() {
        let now = Utc::now();
        let session = CustomerSession::new(&user(), "tok".to_string(), -5, now);
        assert!(session.is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = CustomerSession::new(&user(), "super-secret".to_string(), 60, Utc::now());
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}
