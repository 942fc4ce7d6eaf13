//! # Health and Status List Credentials
//!
//! - `GET /`: health check.
//! - `GET /{status_credential_id}`: a published status list credential.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// Health check message.
pub const HEALTH_MESSAGE: &str = "status-service-git server status: ok.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/{status_credential_id}", get(get_status_credential))
}

/// GET /: liveness; does not touch the status manager.
async fn health() -> Json<Value> {
    Json(json!({ "message": HEALTH_MESSAGE }))
}

/// GET /{status_credential_id}
async fn get_status_credential(
    State(state): State<AppState>,
    Path(status_credential_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state
        .orchestrator
        .get_status_credential(&status_credential_id)
        .await
        .map(Json)
        .map_err(AppError::passthrough)
}
