//! HTTP handlers for the Restaurant POS admin API

pub mod auth;
pub mod category;
pub mod fryer;
pub mod health;
pub mod ingredient;
pub mod kitchen;
pub mod reporting;

pub use auth::*;
pub use category::*;
pub use fryer::*;
pub use health::*;
pub use ingredient::*;
pub use kitchen::*;
pub use reporting::*;
