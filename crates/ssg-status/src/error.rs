//! # Status Manager Errors
//!
//! Internal error type of the git-hosted status manager. Every variant maps
//! to a [`StatusError`] with a definite HTTP code before it leaves the crate:
//!
//! | Variant | Code |
//! |---------|------|
//! | `CredentialNotFound`, `StatusCredentialNotFound` | 404 |
//! | `InvalidTransition`, `InvalidCredentialId` | 400 |
//! | everything else | 500 |

use ssg_core::StatusError;
use thiserror::Error;

use crate::bitstring::BitstringError;
use crate::did::DidError;
use crate::repository::RepositoryError;

/// Errors raised by [`crate::GitStatusManager`].
#[derive(Error, Debug)]
pub enum ManagerError {
    /// No allocation is recorded for the credential.
    #[error("Unable to find credential with ID {0}")]
    CredentialNotFound(String),

    /// No status list credential exists with this identifier.
    #[error("Unable to find status credential with ID {0}")]
    StatusCredentialNotFound(String),

    /// The requested status change is not valid in the credential's state.
    #[error("{0}")]
    InvalidTransition(String),

    /// The credential carries an `id` that cannot key a status record.
    #[error("Credential ID must be a non-empty string.")]
    InvalidCredentialId,

    /// Stored data does not have the expected shape.
    #[error("corrupt status data at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// Reading or writing a repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Encoding or decoding a status list failed.
    #[error(transparent)]
    Bitstring(#[from] BitstringError),

    /// The issuer DID could not be derived.
    #[error(transparent)]
    Did(#[from] DidError),
}

impl ManagerError {
    /// HTTP code reported to callers.
    pub fn code(&self) -> u16 {
        match self {
            Self::CredentialNotFound(_) | Self::StatusCredentialNotFound(_) => 404,
            Self::InvalidTransition(_) | Self::InvalidCredentialId => 400,
            Self::Corrupt { .. } | Self::Repository(_) | Self::Bitstring(_) | Self::Did(_) => 500,
        }
    }
}

impl From<ManagerError> for StatusError {
    fn from(err: ManagerError) -> Self {
        let code = err.code();
        if code >= 500 {
            tracing::error!(error = %err, "status manager failure");
        }
        StatusError::new(code, err.to_string())
    }
}
