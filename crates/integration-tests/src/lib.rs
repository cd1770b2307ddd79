//! Black-box tests against running Threadline servers.
//!
//! # Running Tests
//!
//! ```bash
//! tl-cli migrate all
//! cargo run -p threadline-storefront &
//! cargo run -p threadline-admin &
//! cargo test -p threadline-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` (default `http://localhost:3001`)
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` for signed-in admin tests
//! - `DATABASE_URL` for tests that touch `PostgreSQL` directly

use reqwest::Client;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Connection details for one test run.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url: env_or("STOREFRONT_BASE_URL", "http://localhost:3000"),
            admin_url: env_or("ADMIN_BASE_URL", "http://localhost:3001"),
        }
    }

    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url.trim_end_matches('/'))
    }

    /// Sign in to the admin with `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`.
    ///
    /// Returns `false` when the credentials are not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sign_in_admin(&self) -> Result<bool, reqwest::Error> {
        let (Ok(email), Ok(password)) = (
            std::env::var("TEST_ADMIN_EMAIL"),
            std::env::var("TEST_ADMIN_PASSWORD"),
        ) else {
            return Ok(false);
        };

        let response = self
            .client
            .post(self.admin("/auth/login"))
            .form(&[("email", email.as_str()), ("password", password.as_str())])
            .send()
            .await?;
        Ok(response.status().is_redirection())
    }
}

/// Connect to the shared database named by `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the variable is unset or the connection fails.
pub async fn database() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let url = SecretString::from(std::env::var("DATABASE_URL")?);
    Ok(PgPool::connect(url.expose_secret()).await?)
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
