//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use threadline_backend::{BackendClient, BackendError};
use threadline_core::ColorPalette;

use crate::config::StorefrontConfig;
use crate::db::palette;
use crate::models::CustomerSession;

/// How long a loaded color palette is reused before re-reading the table.
const PALETTE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    backend: BackendClient,
    palette: Cache<(), Arc<ColorPalette>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let palette = Cache::builder()
            .max_capacity(1)
            .time_to_live(PALETTE_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
                palette,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Anonymous backend client, for catalog reads, login and registration.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Backend client that sends the customer's bearer token.
    #[must_use]
    pub fn backend_for(&self, customer: &CustomerSession) -> BackendClient {
        self.inner.backend.authorized(customer.token())
    }

    /// Current color palette.
    ///
    /// Falls back to the default palette when the table cannot be read, so a
    /// database outage never blocks product pages.
    pub async fn palette(&self) -> Arc<ColorPalette> {
        if let Some(palette) = self.inner.palette.get(&()).await {
            return palette;
        }

        match palette::load_palette(self.pool()).await {
            Ok(loaded) => {
                let loaded = Arc::new(loaded);
                self.inner.palette.insert((), Arc::clone(&loaded)).await;
                loaded
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load color palette, using defaults");
                Arc::new(ColorPalette::default())
            }
        }
    }
}
