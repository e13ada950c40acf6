//! knowhow CLI entry point.

use anyhow::Result;
use clap::Parser;
use knowhow::cli::commands::{self, SearchOverrides};
use knowhow::cli::{Cli, Commands};
use knowhow::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("knowhow={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Execute command
    match &cli.command {
        Commands::Search {
            query,
            paths,
            top_k,
            alpha,
            window,
            max_tokens,
            json,
        } => {
            let overrides = SearchOverrides {
                top_k: *top_k,
                alpha: *alpha,
                window: *window,
                max_tokens: *max_tokens,
            };
            commands::run_search(query, paths, &overrides, *json, settings).await?;
        }

        Commands::Chunks { paths, limit } => {
            commands::run_chunks(paths, *limit, settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), settings)?;
        }
    }

    Ok(())
}
