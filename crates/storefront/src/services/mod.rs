//! Multi-step workflows that span several backend calls.
//!
//! # Services
//!
//! - `checkout` - Turn a paid cart into an order

pub mod checkout;
