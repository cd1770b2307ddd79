//! Threadline Core - Shared domain library.
//!
//! This crate provides the types and arithmetic shared by all Threadline
//! components:
//! - `backend` - Typed client for the commerce REST backend
//! - `storefront` - Customer-facing web client
//! - `admin` - Catalog and account administration
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`models`] - Records mirroring backend resources
//! - [`pagination`] - Page-index arithmetic
//! - [`carousel`] - Wrap-around image navigation
//! - [`palette`] - Color name to swatch mapping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod carousel;
pub mod models;
pub mod pagination;
pub mod palette;
pub mod timestamp;
pub mod types;

pub use carousel::Carousel;
pub use pagination::Pagination;
pub use palette::{ColorChip, ColorPalette, PaletteError};
pub use types::*;
