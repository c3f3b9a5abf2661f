//! Underdog goal trading bot - entry point.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use underdog_bot::{AppConfig, Application};

/// Paper-trades goals scored by underdogs in live football matches.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via UNDERDOG_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Poll live matches until Ctrl+C (default)
    Run,
    /// List today's fixtures with odds, run one scan cycle and exit
    Scan,
    /// Check API connectivity and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry RUST_LOG as well as the API key
    dotenvy::dotenv().ok();

    let args = Args::parse();

    underdog_telemetry::init_logging()?;

    info!("Starting underdog bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = AppConfig::resolve_path(args.config);
    info!(config_path = %config_path, "Loading configuration");

    let config = AppConfig::load(&config_path)?;
    info!(
        base_url = %config.api.base_url,
        rate_limit = config.api.rate_limit_per_minute,
        "Configuration loaded"
    );

    let app = Application::new(config)?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => app.run().await?,
        Command::Scan => {
            let report = app.scan_once(Utc::now().date_naive()).await?;
            info!(?report, "Scan finished");
        }
        Command::Check => {
            app.check_connection().await?;
        }
    }

    Ok(())
}
