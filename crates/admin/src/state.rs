//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use threadline_backend::{BackendClient, BackendError};

use crate::config::AdminConfig;
use crate::models::AdminSession;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    backend: BackendClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Anonymous backend client, used only for sign-in.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Backend client carrying the admin's bearer token.
    #[must_use]
    pub fn backend_for(&self, admin: &AdminSession) -> BackendClient {
        self.inner.backend.authorized(admin.token())
    }
}
