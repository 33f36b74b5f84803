//! payroll-engine service binary.
//!
//! Loads configuration, opens the store and serves the HTTP API.

use std::path::PathBuf;

use clap::Parser;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Monthly payroll engine HTTP service.
#[derive(Debug, Parser)]
#[command(name = "payroll-engine", version, about)]
struct Cli {
    /// Directory containing payroll.yaml. Built-in defaults are used when omitted.
    #[arg(short, long, env = "PAYROLL_CONFIG_DIR")]
    config: Option<PathBuf>,

    /// Overrides server.bind_address from the configuration.
    #[arg(long, env = "PAYROLL_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payroll_engine=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(dir) => ConfigLoader::load(dir)?,
        None => {
            tracing::info!("No configuration directory given, using defaults");
            ConfigLoader::default()
        }
    };
    let config = loader.config();

    let state = AppState::from_config(config).await?;
    let app = create_router(state);

    let bind_address = cli.bind.as_deref().unwrap_or(&config.server.bind_address);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!("payroll-engine listening on {bind_address}");

    axum::serve(listener, app).await?;
    Ok(())
}
