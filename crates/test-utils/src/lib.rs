//! Shared test fixtures for the rf-coverage workspace.
//!
//! Provides synthetic DSM layers with predictable shapes so LOS and sweep
//! tests can assert exact outcomes: constant plains, a blocking ridge, a
//! linear gradient and a no-data hole.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod terrain;

pub use terrain::{
    constant_layer, gradient_layer, holed_layer, registry_with, ridge_layer, AREA_CENTRAL,
};
