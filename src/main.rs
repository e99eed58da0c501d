//! Magnolia Workspace Copy Tool
//!
//! Restores selected Magnolia workspace tables from a PostgreSQL dump file

// mgnl-workspace-copy/src/main.rs
mod check;
mod config;
mod errors;
mod restore;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{ConnectionArgs, CopyArgs, RawJsonConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::executor::ProcessExecutor;

#[derive(Parser, Debug)]
#[command(
    name = "mgnl-workspace-copy",
    author,
    version,
    about = "Copy Magnolia workspace data from Postgresql dump file"
)]
struct Cli {
    /// JSON config file with defaults for any flag.
    #[arg(long, env = "WORKSPACE_COPY_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run db workspace copy.
    Copy(CopyArgs),
    /// Check db connection.
    Check(ConnectionArgs),
}

/// Main entry point for the workspace copy tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mgnl_workspace_copy=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run_app(Cli::parse()).await {
        Ok(_) => {
            info!("operation completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let raw_config = match &cli.config {
        Some(path) => RawJsonConfig::load_from_json(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RawJsonConfig::default(),
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping the running command");
            signal_token.cancel();
        }
    });
    let executor = ProcessExecutor::new(cancel);

    match cli.cmd {
        Command::Copy(args) => {
            let request = args.resolve(&raw_config).context("invalid argument")?;
            if request.check_connection {
                check::check_connection(&request.connection, &executor)
                    .await
                    .context("db connection check failed")?;
            }

            let report = restore::run_workspace_restore(&request, &executor)
                .await
                .context("workspace copy failed")?;
            let truncated = report.tables.iter().filter(|t| t.truncated).count();
            info!(
                restored = report.tables.len(),
                truncated,
                warnings = report.warnings.len(),
                "workspace copy finished"
            );
            for table in &report.tables {
                info!(workspace = ?table.workspace, table = %table.table, "restored");
            }
        }
        Command::Check(args) => {
            let connection = args
                .resolve(&raw_config, "")
                .context("invalid argument")?;
            check::check_connection(&connection, &executor).await?;
        }
    }
    Ok(())
}
