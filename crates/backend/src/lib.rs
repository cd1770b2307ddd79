//! Threadline Backend - client for the commerce REST backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth; nothing is synced locally
//! - JSON over HTTP via `reqwest`, bodies typed with `serde`
//! - Products and the category list are cached in memory via `moka`
//! - A user's bearer token is attached with [`BackendClient::authorized`]
//!
//! # Example
//!
//! ```rust,ignore
//! use threadline_backend::{BackendClient, BackendConfig};
//!
//! let client = BackendClient::new(&BackendConfig::new(base_url))?;
//! let login = client.login("ada@example.com", "hunter22").await?;
//!
//! let user = client.authorized(&login.token);
//! let cart = user.get_cart(&user_id).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod api;
mod cache;
mod client;
mod error;
pub mod requests;

pub use client::{BackendClient, BackendConfig};
pub use error::BackendError;
pub use requests::*;
