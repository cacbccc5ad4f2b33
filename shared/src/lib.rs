//! Shared types and models for the Restaurant POS admin platform
//!
//! This crate contains the domain types and pure computations shared between
//! the backend, the admin front end (via WASM), and the test suites.

pub mod alerts;
pub mod models;
pub mod types;
pub mod validation;

pub use alerts::*;
pub use models::*;
pub use types::*;
pub use validation::*;
