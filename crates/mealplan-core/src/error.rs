use thiserror::Error;

/// Top-level error type for the meal planner client.
///
/// Covers configuration loading and serialization. Chat-level failures
/// (backend errors, validation) live in `mealplan-chat` and never reach the
/// user as panics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MealPlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MealPlanError {
    fn from(err: toml::de::Error) -> Self {
        MealPlanError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MealPlanError {
    fn from(err: toml::ser::Error) -> Self {
        MealPlanError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MealPlanError {
    fn from(err: serde_json::Error) -> Self {
        MealPlanError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for meal planner operations.
pub type Result<T> = std::result::Result<T, MealPlanError>;
