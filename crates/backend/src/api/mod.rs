//! Endpoint groups. Each module adds an `impl BackendClient` block.

mod accounts;
mod catalog;
mod shopping;
