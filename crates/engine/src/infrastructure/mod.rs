//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod cache;
pub mod clock;
pub mod config;
pub mod correlation;
pub mod cost;
pub mod image_storage;
pub mod memory;
pub mod ports;
pub mod side_effects;
pub mod sqlite;
