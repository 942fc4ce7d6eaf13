//! # Credential Status Endpoints
//!
//! - `POST /credentials/status/allocate`: attach status list entries to a
//!   credential.
//! - `POST /credentials/status`: revoke, suspend or unsuspend a credential.
//! - `GET /credentials/{credential_id}`: status bookkeeping for a credential.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ssg_core::{CredentialInfo, StatusUpdateRequest, VerifiableCredential};

use crate::error::{error_status, AppError};
use crate::extractors::extract_validated_json;
use crate::state::AppState;

const ALLOCATE_FALLBACK: &str = "Unable to allocate status position.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credentials/status/allocate", post(allocate_status))
        .route("/credentials/status", post(update_status))
        .route("/credentials/{credential_id}", get(get_credential_info))
}

/// POST /credentials/status/allocate
async fn allocate_status(
    State(state): State<AppState>,
    body: Result<Json<VerifiableCredential>, JsonRejection>,
) -> Result<Json<VerifiableCredential>, AppError> {
    let credential = extract_validated_json(body)?;
    state
        .orchestrator
        .allocate_supported_statuses(credential)
        .await
        .map(Json)
        .map_err(|err| AppError::from_status_error(err, ALLOCATE_FALLBACK))
}

/// POST /credentials/status
///
/// Responds with the outcome record's own code, including failures. The
/// body code always matches the HTTP status.
async fn update_status(
    State(state): State<AppState>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = extract_validated_json(body)?;
    let credential_id = request.credential_id.unwrap_or_default();
    let status = request
        .credential_status
        .and_then(|entries| entries.into_iter().next())
        .and_then(|entry| entry.status)
        .unwrap_or_default();

    let mut outcome = state.orchestrator.update_status(&credential_id, &status).await;
    let code = if outcome.is_success() {
        StatusCode::from_u16(outcome.code).unwrap_or(StatusCode::OK)
    } else {
        tracing::warn!(code = outcome.code, message = %outcome.message, "status update not applied");
        error_status(outcome.code)
    };
    outcome.code = code.as_u16();
    Ok((code, Json(outcome)).into_response())
}

/// GET /credentials/{credential_id}
async fn get_credential_info(
    State(state): State<AppState>,
    Path(credential_id): Path<String>,
) -> Result<Json<CredentialInfo>, AppError> {
    state
        .orchestrator
        .get_credential_info(&credential_id)
        .await
        .map(Json)
        .map_err(AppError::passthrough)
}
