//! Gangbook Engine library.
//!
//! Server side of the fighter mutation layer.
//!
//! ## Structure
//!
//! - `use_cases/` - the mutation gateway, one use case per operation
//! - `infrastructure/` - port traits and their adapters (SQLite, in-memory,
//!   filesystem images, side-effect worker, snapshot cache)
//! - `api/` - HTTP entry points
//! - `app` - application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// End-to-end scenarios over the in-memory store and the HTTP router.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
