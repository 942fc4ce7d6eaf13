//! # API Error Types
//!
//! The terminal error chain of the service. Every failure a handler returns
//! becomes an [`AppError`], which is logged and rendered as the JSON body
//! `{code, message}` with `code` as the HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use ssg_core::StatusError;
use thiserror::Error;

/// Message for requests matching no route.
pub const INVALID_PATH_MESSAGE: &str = "An invalid path was requested.";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body missing or malformed (400).
    #[error("{0}")]
    BadRequest(String),

    /// No route matches the request (404).
    #[error("{0}")]
    NotFound(String),

    /// A failure reported by the status manager, with the code it carries.
    #[error("{message}")]
    Status { code: u16, message: String },
}

impl AppError {
    /// Normalize a status manager failure: a missing message becomes
    /// `fallback` and a missing code becomes 500.
    pub fn from_status_error(err: StatusError, fallback: &str) -> Self {
        Self::Status {
            code: err.code_or(500),
            message: err.message_or_else(|| fallback.to_string()),
        }
    }

    /// Forward a status manager failure with its own code and message. Only
    /// what is absent is filled in, from the code's canonical reason.
    pub fn passthrough(err: StatusError) -> Self {
        let code = err.code_or(500);
        let message = err.message_or_else(|| canonical_reason(code).to_string());
        Self::Status { code, message }
    }

    /// HTTP status of the rendered response.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Status { code, .. } => error_status(*code),
        }
    }
}

/// HTTP status for a failure code. Codes outside the HTTP error range are
/// reported as 500.
pub fn error_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn canonical_reason(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Internal Server Error")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::warn!(code = status.as_u16(), error = %message, "request rejected");
        }

        let body = ErrorBody {
            code: status.as_u16(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback handler for unmatched paths and unsupported methods.
pub async fn invalid_path() -> AppError {
    AppError::NotFound(INVALID_PATH_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, ErrorBody) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_request_renders_code_and_message() {
        let (status, body) = render(AppError::BadRequest("missing body".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, 400);
        assert_eq!(body.message, "missing body");
    }

    #[tokio::test]
    async fn status_error_code_is_kept() {
        let err = StatusError::not_found("Unable to find credential with ID kj09ij");
        let (status, body) = render(AppError::from_status_error(err, "fallback")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Unable to find credential with ID kj09ij");
    }

    #[tokio::test]
    async fn missing_code_and_message_use_fallbacks() {
        let err = StatusError::from_parts(None, None);
        let (status, body) =
            render(AppError::from_status_error(err, "Unable to allocate status position.")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, 500);
        assert_eq!(body.message, "Unable to allocate status position.");
    }

    #[tokio::test]
    async fn passthrough_fills_only_missing_message() {
        let (status, body) = render(AppError::passthrough(StatusError::from_parts(Some(404), None))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Not Found");

        let (_, body) = render(AppError::passthrough(StatusError::message_only("disk full"))).await;
        assert_eq!(body.code, 500);
        assert_eq!(body.message, "disk full");
    }

    #[tokio::test]
    async fn non_error_codes_render_as_500() {
        for code in [0, 200, 302, 1000] {
            let (status, body) = render(AppError::Status {
                code,
                message: "odd".into(),
            })
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "code {code}");
            assert_eq!(body.code, 500);
        }
    }

    #[tokio::test]
    async fn invalid_path_is_404() {
        let (status, body) = render(invalid_path().await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, INVALID_PATH_MESSAGE);
    }
}
