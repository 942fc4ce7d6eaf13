//! # ssg-api — Credential Status Service
//!
//! HTTP API for the status lifecycle of verifiable credentials, built on
//! Axum/Tower/Tokio. Handlers validate request shape, delegate to the
//! [`StatusOrchestrator`] and render results; the orchestrator talks to the
//! status manager capability in `ssg-status`.
//!
//! ## Routes
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/` | health check |
//! | POST | `/credentials/status/allocate` | allocate status list positions |
//! | POST | `/credentials/status` | revoke, suspend, unsuspend |
//! | GET | `/credentials/{credential_id}` | credential status info |
//! | GET | `/{status_credential_id}` | status list credential |
//!
//! Anything else, including a known path with the wrong method, is a 404
//! `{code, message}` response.
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer (when access logging is enabled) → CorsLayer (permissive)
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG.
//! - No status list logic in route handlers.
//! - All errors map to structured JSON responses via `AppError`.

pub mod config;
pub mod error;
pub mod extractors;
pub mod orchestrator;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::AppError;
pub use orchestrator::StatusOrchestrator;
pub use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let access_logging = state.access_logging;

    let router = Router::new()
        .merge(routes::status::router())
        .merge(routes::credentials::router())
        .fallback(error::invalid_path)
        .method_not_allowed_fallback(error::invalid_path)
        .layer(CorsLayer::permissive())
        .with_state(state);

    if access_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
