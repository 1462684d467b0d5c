use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MealPlanError, Result};

/// Backend origin used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Range of `top_n` values the recommendation service accepts.
pub const TOP_N_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Top-level configuration for the meal planner client.
///
/// Loaded from `~/.mealplan/config.toml` by default. Every section and key
/// is optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealPlanConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub survey: SurveyConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl MealPlanConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MealPlanConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MealPlanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check values the backend would reject.
    pub fn validate(&self) -> Result<()> {
        if !TOP_N_RANGE.contains(&self.backend.top_n) {
            return Err(MealPlanError::Config(format!(
                "backend.top_n must be between {} and {}, got {}",
                TOP_N_RANGE.start(),
                TOP_N_RANGE.end(),
                self.backend.top_n
            )));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(MealPlanError::Config(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Recommendation service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Origin of the recommendation service, without a trailing path.
    pub base_url: String,
    /// Number of recipes requested per recommendation.
    pub top_n: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            top_n: 5,
        }
    }
}

/// What happens to survey answers when the user skips the rest of the survey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Discard partial answers; no baseline constraints for the session.
    #[default]
    ClearConstraints,
    /// Compile whatever was answered before the skip into constraints.
    RetainAnswered,
}

/// Preference survey settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Run the survey before freeform chat.
    pub enabled: bool,
    /// Constraint handling when the survey is skipped.
    pub skip_policy: SkipPolicy,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_policy: SkipPolicy::ClearConstraints,
        }
    }
}

/// Conversation wording settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Synthetic prompt sent right after the survey completes.
    pub starter_prompt: String,
    /// Transient text shown while a request is outstanding.
    pub loading_placeholder: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            starter_prompt: "Suggest a few recipes I would enjoy based on my preferences."
                .to_string(),
            loading_placeholder: "Thinking...".to_string(),
        }
    }
}
