//! Session-held state for the admin client.

pub mod session;

pub use session::{AdminSession, Flash, FlashLevel, keys as session_keys};
