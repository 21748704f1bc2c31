//! Turnover Insight Server Module
//!
//! HTTP server exposing both turnover classifiers: prediction, chart data,
//! model info and new-data evaluation endpoints, plus small embedded pages.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::{ServerError, DATA_NOT_LOADED, MODEL_NOT_LOADED};
pub use handlers::parse_feature;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::artifacts::ArtifactPaths;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: String,
    pub static_dir: Option<String>,
    /// Secondary dataset; defaults to `<models_dir>/turnover_new_data.csv`
    pub new_data_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            models_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| "./models".to_string()),
            static_dir: Some(std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string())),
            new_data_path: std::env::var("NEW_DATA_PATH").ok().filter(|p| !p.is_empty()),
        }
    }
}

impl ServerConfig {
    pub fn with_models_dir(mut self, dir: impl Into<String>) -> Self {
        self.models_dir = dir.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_new_data_path(mut self, path: impl Into<String>) -> Self {
        self.new_data_path = Some(path.into());
        self
    }

    /// Every artifact location derived from this config
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let paths = ArtifactPaths::in_dir(&self.models_dir);
        match &self.new_data_path {
            Some(path) => paths.with_new_data(path),
            None => paths,
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        models_dir = %config.models_dir,
        started_at = %start_time.to_rfc3339(),
        "Loading artifacts"
    );

    if let Some(ref static_dir) = config.static_dir {
        if !std::path::Path::new(static_dir).exists() {
            warn!(static_dir = %static_dir, "Static directory not found, /static will be unavailable");
        }
    }

    // artifact loading and the startup evaluation are CPU-bound
    let load_config = config.clone();
    let state = Arc::new(tokio::task::spawn_blocking(move || AppState::load(load_config)).await?);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        "Turnover Insight server starting"
    );
    info!(url = %format!("http://{}", addr), "Pages available");
    info!(url = %format!("http://{}/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
