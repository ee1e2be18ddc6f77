//! End-to-end tests.
//!
//! These run the fully wired `App` over the in-memory store:
//! - Every use case built the way `main` builds them
//! - Side effects captured by a recording sink instead of the worker
//! - HTTP scenarios driven through the router with `tower::ServiceExt`
//!
//! ```bash
//! cargo test -p gangbook-engine --lib e2e_tests
//! ```

mod e2e_helpers;
mod fighter_flow_tests;
mod http_tests;

pub use e2e_helpers::*;
