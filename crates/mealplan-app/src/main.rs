//! Meal planner binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (stderr, so the transcript on stdout stays clean)
//! 3. Build the HTTP backend client and the conversation controller
//! 4. Run the terminal REPL

mod cli;
mod view;

use clap::Parser;

use mealplan_chat::{default_questions, ConversationController, HttpBackend};
use mealplan_core::config::MealPlanConfig;

use crate::cli::CliArgs;
use crate::view::TerminalView;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Tracing is not up yet, so a load failure is reported below.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = if config_file.exists() {
        match MealPlanConfig::load(&config_file) {
            Ok(config) => (config, None),
            Err(e) => (MealPlanConfig::default(), Some(e)),
        }
    } else {
        (MealPlanConfig::default(), None)
    };

    // CLI and environment overrides.
    config.general.log_level = args.resolve_log_level(&config.general.log_level);
    config.backend.base_url = args.resolve_backend_url(&config.backend.base_url);
    if args.skip_survey {
        config.survey.enabled = false;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting mealplan v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::debug!(path = %config_file.display(), "Configuration resolved"),
    }

    // Backend and session.
    let backend = HttpBackend::new(&config.backend.base_url)?;
    tracing::info!(base_url = %backend.base_url(), top_n = config.backend.top_n, "Backend client ready");

    let mut controller = match ConversationController::new(&config, default_questions()) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // REPL.
    let mut view = TerminalView::new()?;
    view.run(&mut controller, &backend).await?;

    Ok(())
}
