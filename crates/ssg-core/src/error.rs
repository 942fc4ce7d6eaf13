//! # Status Error Carrier
//!
//! [`StatusError`] is the one failure type that crosses the boundary between
//! the status manager capability and its callers. It carries an optional
//! HTTP status code and an optional human-readable message. Callers apply
//! their own fallbacks (`code_or`, `message_or_else`) so that each layer can
//! choose the default that makes sense for the operation it performed.

use thiserror::Error;

/// A failure reported by the status manager or raised while orchestrating it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.code, .message))]
pub struct StatusError {
    code: Option<u16>,
    message: Option<String>,
}

impl StatusError {
    /// Create an error with both a code and a message.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: Some(message.into()),
        }
    }

    /// Create an error from optional parts, as reported by an arbitrary backend.
    pub fn from_parts(code: Option<u16>, message: Option<String>) -> Self {
        Self { code, message }
    }

    /// 400: the request was rejected before or by the backend.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// 404: unknown credential or status credential identifier.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// 500: any other backend or internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    /// An error carrying a message but no code.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(message.into()),
        }
    }

    /// The carried HTTP status code, if any.
    pub fn code(&self) -> Option<u16> {
        self.code
    }

    /// The carried message, if any. Empty messages count as absent.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    /// The carried code, or `default` when the backend supplied none.
    pub fn code_or(&self, default: u16) -> u16 {
        self.code.unwrap_or(default)
    }

    /// The carried message, or the result of `fallback` when absent.
    pub fn message_or_else(&self, fallback: impl FnOnce() -> String) -> String {
        self.message().map_or_else(fallback, str::to_string)
    }
}

fn describe(code: &Option<u16>, message: &Option<String>) -> String {
    match (code, message.as_deref().filter(|m| !m.is_empty())) {
        (Some(code), Some(message)) => format!("[{code}] {message}"),
        (Some(code), None) => format!("[{code}] status manager error"),
        (None, Some(message)) => message.to_string(),
        (None, None) => "status manager error".to_string(),
    }
}
