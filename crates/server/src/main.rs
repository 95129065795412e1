//! smartnav-mcp server entry point.
//!
//! Boots the offline cache coordinator and serves it over MCP on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use smartnav_client::{Coordinator, FetchConfig, GeocodeClient, GeocodeConfig, HttpNetwork};
use smartnav_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
#[cfg(test)]
mod testing;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(db = %config.db_path.display(), "starting smartnav server on stdio transport");

    let db = CacheDb::open(&config.db_path).await.context("opening cache database")?;
    let network = Arc::new(HttpNetwork::new(FetchConfig::from(&config))?);
    let coordinator = Arc::new(Coordinator::from_config(&config, db, network)?);

    match coordinator.install().await {
        Ok(_) => {
            coordinator.activate().await?;
        }
        Err(e) => match coordinator.serving().await {
            Some(previous) => {
                tracing::error!(error = %e, store = %previous.static_store, "install failed; previous version keeps serving")
            }
            None => tracing::error!(error = %e, "install failed; no previous version, serving without interception"),
        },
    }

    let geocoder = GeocodeClient::new(coordinator.clone(), GeocodeConfig::from(&config));
    let handler = handler::SmartNavServer::new(coordinator, geocoder);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
