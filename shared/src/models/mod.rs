//! Domain models for the Restaurant POS admin platform

mod category;
mod fryer;
mod ingredient;
mod kitchen;
mod user;

pub use category::*;
pub use fryer::*;
pub use ingredient::*;
pub use kitchen::*;
pub use user::*;
