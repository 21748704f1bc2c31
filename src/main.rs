//! Turnover Insight - Main Entry Point
//!
//! Serves the two turnover classifiers over HTTP, and fits or evaluates
//! their artifacts from the command line.

use clap::Parser;
use turnover_insight::cli::{cmd_evaluate, cmd_fit, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnover_insight=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, host, models_dir, new_data }) => {
            cmd_serve(host, port, models_dir, new_data).await?;
        }
        Some(Commands::Fit { data, models_dir, n_estimators, max_depth }) => {
            cmd_fit(&data, &models_dir, n_estimators, max_depth)?;
        }
        Some(Commands::Evaluate { models_dir }) => {
            cmd_evaluate(&models_dir)?;
        }
        None => {
            cmd_serve(None, None, None, None).await?;
        }
    }

    Ok(())
}
