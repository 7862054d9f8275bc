//! Covenant CLI - Command-line dashboard for restrictive-covenant deed reviews.

use clap::Parser;
use covenant_cli::commands::{self, Engine};
use covenant_cli::{Cli, Command, Config, Formatter};
use covenant_store::SqliteStore;
use tracing::debug;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so JSON on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> covenant_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config, falling back to defaults when the file is absent
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    let database = cli.database.clone().unwrap_or_else(|| config.database.clone());
    debug!(database = %database.display(), "using database");

    // Handle commands
    match cli.command {
        Command::Dashboard(args) => {
            commands::execute_dashboard(args, &config, &database, &formatter).await?;
        }
        cmd => {
            // Commands that share one read-only handle
            let engine = Engine::new(SqliteStore::open(&database)?);

            match cmd {
                Command::Counts => {
                    commands::execute_counts(&engine, &formatter).await?;
                }
                Command::TopGrantors(args) => {
                    commands::execute_top_grantors(args, &engine, &formatter).await?;
                }
                Command::TopExclusionTypes(args) => {
                    commands::execute_top_exclusion_types(args, &engine, &formatter).await?;
                }
                Command::TimeSeries(args) => {
                    commands::execute_time_series(args, &config.counties, &engine, &formatter).await?;
                }
                Command::ExclusionTypes => {
                    commands::execute_exclusion_types(&engine, &formatter).await?;
                }
                Command::Health => {
                    commands::execute_health(&engine, &formatter).await?;
                }
                Command::Dashboard(_) => unreachable!(),
            }
        }
    }

    Ok(())
}
