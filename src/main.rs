//! Levrok - site assistant and scheduling CLI
//!
//! Main entry point for the `levrok` application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use levrok::cli::{Cli, Commands};
use levrok::commands;
use levrok::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { no_stream } => {
            tracing::info!("Starting interactive chat");
            if no_stream {
                tracing::debug!("Streaming disabled by CLI flag");
            }
            commands::chat::run_chat(config, no_stream).await?;
            Ok(())
        }
        Commands::Slots { date, timezone } => {
            tracing::info!("Checking availability for {}", date);
            commands::slots::run_slots(config, date, timezone).await?;
            Ok(())
        }
        Commands::Book { timezone } => {
            tracing::info!("Starting booking wizard");
            commands::book::run_book(config, timezone).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("levrok=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
