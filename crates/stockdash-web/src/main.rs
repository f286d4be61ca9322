mod cli;
mod error;
mod routes;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use stockdash_core::{Dashboard, DashboardConfig, ReqwestHttpClient};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::HostError;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), HostError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stockdash_core=debug,stockdash_web=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(path) = cli.catalog {
        config.catalog_path = Some(path);
    }

    let catalog = config.load_catalog()?;
    let source = config
        .catalog_path
        .as_deref()
        .map_or_else(|| String::from("bundled"), |path| path.display().to_string());
    info!(industries = catalog.industries().len(), %source, "catalog loaded");

    let http_client = Arc::new(ReqwestHttpClient::new()?);
    let dashboard = Dashboard::from_config(&config, catalog, http_client)?;
    info!(bucket = dashboard.bucket(), region = %config.region, "dashboard ready");

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "listening");

    axum::serve(listener, router(AppState::new(dashboard)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
