pub mod error;
pub mod logger;
pub mod price;
pub mod validation;
