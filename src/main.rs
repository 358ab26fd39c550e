//! DriveLinks replay tool.
//!
//! Loads a fixture of listings and event batches, feeds it through the
//! link cache the way a client session would, and prints the result.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use drivelinks::fixture::Fixture;
use drivelinks::output::{self, OutputFormat};
use drivelinks::replay::{self, Delivery};
use drivelinks_core::config::AppConfig;
use drivelinks_core::config::logging::LoggingConfig;
use drivelinks_core::error::AppError;

/// Replay listings and events through the link cache.
#[derive(Debug, Parser)]
#[command(name = "drivelinks-replay", version, about)]
struct Cli {
    /// Fixture file (JSON).
    #[arg(long)]
    fixture: PathBuf,

    /// Configuration environment overlay (`config/{env}`).
    #[arg(long, default_value = "development")]
    env: String,

    /// Explicit configuration file, replacing the layered lookup.
    #[arg(long)]
    config: Option<String>,

    /// Deliver batches through a per-share queue instead of direct
    /// subscription.
    #[arg(long)]
    queued: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Replay failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from an explicit file or the layered sources
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    match &cli.config {
        Some(path) => AppConfig::load_file(path),
        None => AppConfig::load(&cli.env),
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting drivelinks-replay v{} (delete mode: {})",
        env!("CARGO_PKG_VERSION"),
        config.cache.delete_mode
    );

    let fixture = Fixture::load(&cli.fixture)?;
    let delivery = if cli.queued {
        Delivery::Queued
    } else {
        Delivery::Subscribed
    };

    let report = replay::replay(&config, fixture, delivery).await?;
    output::print_report(&report, cli.format);
    Ok(())
}
