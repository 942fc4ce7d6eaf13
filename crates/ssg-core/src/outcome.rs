//! Outcome record returned by every status mutation.

use serde::{Deserialize, Serialize};

/// `{code, message}` result of a status update, whether it succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// HTTP status code to respond with.
    pub code: u16,
    /// Human-readable description of the outcome.
    pub message: String,
}

impl OutcomeRecord {
    /// Build an outcome record.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A 200 outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(200, message)
    }

    /// Whether the outcome reports success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}
