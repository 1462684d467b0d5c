//! CLI argument definitions for the meal planner.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MEALPLAN_CONFIG";
/// Environment variable overriding the backend origin.
pub const BACKEND_URL_ENV: &str = "MEALPLAN_BACKEND_URL";

/// Meal planner: a short preference survey, then chat for recipe ideas.
#[derive(Parser, Debug)]
#[command(name = "mealplan", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Recommendation service origin, e.g. http://localhost:8000.
    #[arg(short = 'b', long = "backend-url")]
    pub backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Start in freeform chat without the preference survey.
    #[arg(long = "skip-survey")]
    pub skip_survey: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MEALPLAN_CONFIG env var > ~/.mealplan/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend origin.
    ///
    /// Priority: --backend-url flag > MEALPLAN_BACKEND_URL env var > config file value.
    pub fn resolve_backend_url(&self, config_url: &str) -> String {
        first_non_blank(
            self.backend_url.as_deref(),
            std::env::var(BACKEND_URL_ENV).ok().as_deref(),
            config_url,
        )
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        first_non_blank(self.log_level.as_deref(), None, config_level)
    }
}

fn first_non_blank(flag: Option<&str>, env: Option<&str>, fallback: &str) -> String {
    flag.into_iter()
        .chain(env)
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".mealplan").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".mealplan").join("config.toml");
    }
    PathBuf::from("config.toml")
}
