//! lawfirm-portal - command-line client for the law firm portal.
//!
//! Signs in against the portal backend, keeps the session in a local file
//! and opens portal pages through the same route guard a browser host uses.

use clap::Parser;
use lawfirm_portal_access::{FileStorage, ReqwestTransport, SessionStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod config;
mod error;

use commands::{App, Command};
use config::CliConfig;
use error::CliError;

/// lawfirm-portal - law firm portal client
#[derive(Parser, Debug)]
#[command(name = "lawfirm-portal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "lawfirm-portal.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            if let Some(route) = e.redirect_target() {
                println!("→ {route}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = CliConfig::load(&cli.config).map_err(|e| CliError::Config {
        details: e.to_string(),
    })?;
    tracing::debug!(
        base_url = config.api.base_url(),
        session = %config.session.path.display(),
        "configuration loaded"
    );

    let transport = ReqwestTransport::new(&config.api).map_err(|e| {
        tracing::debug!(error = %e, "HTTP client setup failed");
        CliError::Transport {
            details: e.current_context().to_string(),
        }
    })?;
    let session = SessionStore::new(FileStorage::new(config.session.path));

    App::new(transport, session, config.api.endpoints().clone())
        .run(cli.command)
        .await
}
