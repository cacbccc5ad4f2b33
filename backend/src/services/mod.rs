//! Business logic services for the Restaurant POS admin backend

pub mod auth;
pub mod category;
pub mod fryer;
pub mod ingredient;
pub mod kitchen;
pub mod nonce;
pub mod reporting;

pub use auth::AuthService;
pub use category::CategoryService;
pub use fryer::FryerService;
pub use ingredient::IngredientService;
pub use kitchen::KitchenService;
pub use nonce::NonceService;
pub use reporting::ReportingService;
