//! Authentication and user management.

use reqwest::Method;
use threadline_core::models::User;
use threadline_core::{UserId, UserRole};
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::BackendError;
use crate::requests::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest};

impl BackendClient {
    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] (or a 400 status) for bad
    /// credentials, or an error if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let request = self
            .request(Method::POST, &["auth", "login"])?
            .json(&LoginRequest { email, password });
        self.send_json(request).await
    }

    /// Ask the backend to email a verification link.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn send_verification_email(&self, email: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["auth", "send-verification"])?
            .json(&serde_json::json!({ "email": email }));
        self.send_empty(request).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All user accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, BackendError> {
        let request = self.request(Method::GET, &["users"])?;
        self.send_json(request).await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns a 4xx [`BackendError::Status`] when the backend rejects the
    /// registration (e.g. email already in use).
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, BackendError> {
        let request = self.request(Method::POST, &["users"])?.json(registration);
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<User, BackendError> {
        let request = self.request(Method::GET, &["users", id.as_str()])?;
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no user has this email.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, BackendError> {
        let request = self
            .request(Method::GET, &["users", "by-email"])?
            .query(&[("email", email)]);
        self.send_json(request).await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %id, role = %role))]
    pub async fn update_user_role(&self, id: &UserId, role: UserRole) -> Result<(), BackendError> {
        let request = self
            .request(Method::PUT, &["users", id.as_str()])?
            .json(&UpdateUserRequest { role });
        self.send_empty(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &["users", id.as_str()])?;
        self.send_empty(request).await
    }
}
