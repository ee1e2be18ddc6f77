//! Use cases - user story orchestration.
//!
//! Each module groups the use cases for one area of the roster.

pub mod fighter;

pub use fighter::{FighterError, FighterUseCases};
