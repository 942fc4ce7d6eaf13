//! # Request Body Extraction
//!
//! Handlers take `Result<Json<T>, JsonRejection>` so that a missing,
//! non-JSON or mistyped body is treated like an empty one: the handler
//! answers 400 with its own message instead of axum's rejection text.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use ssg_core::{StatusUpdateRequest, VerifiableCredential, SUPPORTED_STATUS_TYPE};

use crate::error::AppError;

/// Request bodies that check their own business rules after parsing.
pub trait Validate {
    /// Message reported when the body is absent or unusable.
    const MISSING_BODY: &'static str;

    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body and validate it. Rejections are reported with
/// [`Validate::MISSING_BODY`].
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = result.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "request body rejected");
        AppError::BadRequest(T::MISSING_BODY.to_string())
    })?;
    value.validate().map_err(AppError::BadRequest)?;
    Ok(value)
}

impl Validate for VerifiableCredential {
    const MISSING_BODY: &'static str = "A Verifiable Credential must be provided in the body.";

    fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err(Self::MISSING_BODY.to_string());
        }
        Ok(())
    }
}

impl Validate for StatusUpdateRequest {
    const MISSING_BODY: &'static str = "A status update request must be provided in the body.";

    fn validate(&self) -> Result<(), String> {
        let has_id = self.credential_id.as_deref().is_some_and(|id| !id.is_empty());
        let first = self
            .credential_status
            .as_ref()
            .and_then(|statuses| statuses.first());
        let Some(first) = first.filter(|_| has_id) else {
            return Err(Self::MISSING_BODY.to_string());
        };
        if first.status_type.as_deref() != Some(SUPPORTED_STATUS_TYPE) {
            return Err(format!(
                "{SUPPORTED_STATUS_TYPE} is the only supported status type."
            ));
        }
        Ok(())
    }
}
