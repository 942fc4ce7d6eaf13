//! # ssg-api — Binary Entry Point
//!
//! Loads configuration, installs logging, builds the status manager and
//! serves the API over HTTP, or over HTTPS with the dev-only certificate
//! pair when `ENABLE_HTTPS_FOR_DEV` is set.

use std::net::SocketAddr;

use ssg_api::{telemetry, AppConfig, AppState, StatusOrchestrator};

const DEV_CERT_FILE: &str = "server-dev-only.cert";
const DEV_KEY_FILE: &str = "server-dev-only.key";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().init();
            tracing::error!("Invalid configuration: {e}");
            return Err(e.into());
        }
    };

    telemetry::init(&config.logging)?;
    tracing::debug!(?config, "configuration loaded");

    let orchestrator = StatusOrchestrator::new(config.status.clone());
    orchestrator.ensure_initialized(None).await.map_err(|e| {
        tracing::error!("Status manager initialization failed: {e}");
        e
    })?;

    let state = AppState::new(orchestrator).with_access_logging(config.logging.enable_access_logging);
    let app = ssg_api::app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if config.enable_https_for_dev {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(DEV_CERT_FILE, DEV_KEY_FILE)
            .await
            .map_err(|e| {
                tracing::error!("Cannot load {DEV_CERT_FILE}/{DEV_KEY_FILE}: {e}");
                e
            })?;
        tracing::info!("Server running on port {} with https", config.port);
        axum_server::bind_rustls(addr, tls)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server running on port {} with http", config.port);
        axum::serve(listener, app).await?;
    }

    Ok(())
}
