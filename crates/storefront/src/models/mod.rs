//! Session-held state for the storefront.
//!
//! Catalog, cart and order records come from `threadline_core::models`;
//! this module only covers what the storefront keeps between requests.

pub mod session;

pub use session::{CustomerSession, Flash, FlashLevel, PendingPayment, Theme, keys as session_keys};
