//! Session-related types for admin authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use threadline_core::models::User;
use threadline_core::{UserId, UserRole};

/// Session-stored admin identity.
///
/// The role is captured at sign-in; a demoted admin keeps access only until
/// the token expires or the backend starts refusing it.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    #[must_use]
    pub fn new(user: &User, token: String, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            name: user.full_name(),
            role: user.role,
            token,
            expires_at: now + Duration::seconds(expires_in_secs.max(0)),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Signed in, unexpired, and holding the admin role.
    #[must_use]
    pub fn grants_access_at(&self, now: DateTime<Utc>) -> bool {
        self.role.is_admin() && !self.is_expired_at(now)
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
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

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Signed-in admin.
    pub const ADMIN: &str = "admin";

    /// Pending one-shot notification.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        serde_json::from_value(serde_json::json!({
            "userId": "u-7",
            "email": "ops@example.com",
            "firstName": "Grace",
            "lastName": "Hopper",
            "createdAt": "2024-05-01T10:00:00Z",
            "isEmailVerified": true,
            "role": role
        }))
        .expect("valid user json")
    }

    #[test]
    fn test_access_requires_admin_role() {
        let now = Utc::now();
        let admin = AdminSession::new(&user("admin"), "t".to_string(), 600, now);
        let customer = AdminSession::new(&user("customer"), "t".to_string(), 600, now);

        assert!(admin.grants_access_at(now));
        assert!(!customer.grants_access_at(now));
        assert_eq!(admin.name, "Grace Hopper");
    }

    #[test]
    fn test_access_ends_at_expiry() {
        let now = Utc::now();
        let admin = AdminSession::new(&user("admin"), "t".to_string(), 600, now);
        assert!(admin.grants_access_at(now + Duration::seconds(599)));
        assert!(!admin.grants_access_at(now + Duration::seconds(600)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let admin = AdminSession::new(&user("admin"), "bearer-abc".to_string(), 60, Utc::now());
        assert!(!format!("{admin:?}").contains("bearer-abc"));
    }
}
