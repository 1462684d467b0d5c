pub mod config;
pub mod error;
pub mod types;

pub use config::MealPlanConfig;
pub use error::{MealPlanError, Result};
pub use types::*;
