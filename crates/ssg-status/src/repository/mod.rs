//! # Repository Adapters
//!
//! The status manager stores JSON documents in git repositories. Adapters
//! expose a repository as a flat map from file path to JSON document, with an
//! opaque revision token used for optimistic concurrency on update.
//!
//! Revisions are service-specific: the blob SHA on GitHub, the last commit ID
//! on GitLab, a counter in memory.

pub mod github;
pub mod gitlab;
pub mod memory;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

/// A JSON document read from a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Parsed file content.
    pub content: Value,
    /// Revision token to pass back when updating the file.
    pub revision: Option<String>,
}

/// Errors from repository adapters.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The git host returned a non-2xx status.
    #[error("{service} API {endpoint} returned {status}: {body}")]
    Api {
        service: &'static str,
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The file exists but is not base64-encoded JSON.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The file changed since it was read.
    #[error("write conflict on {path}")]
    Conflict { path: String },

    /// The repository does not exist or the token cannot see it.
    #[error("{service} repository {repository} does not exist or is not visible with the configured access token")]
    Inaccessible {
        service: &'static str,
        repository: String,
    },

    /// The HTTP client could not be configured.
    #[error("client configuration error: {0}")]
    Client(String),
}

impl RepositoryError {
    /// Whether the request may not have reached the host, or its answer was
    /// lost.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

/// File-level access to one repository.
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Check that the repository itself is reachable with the configured
    /// credentials. Hosts answer 404 for private repositories a token cannot
    /// see, so a missing file alone proves nothing.
    async fn check_access(&self) -> Result<(), RepositoryError>;

    /// Read and parse a JSON file. `Ok(None)` when the file does not exist.
    async fn read(&self, path: &str) -> Result<Option<Document>, RepositoryError>;

    /// One attempt to create (`revision` is `None`) or update a JSON file.
    async fn put(
        &self,
        path: &str,
        content: &Value,
        revision: Option<&str>,
        message: &str,
    ) -> Result<(), RepositoryError>;

    /// Create or update a JSON file. Attempts that fail in transit are read
    /// back before being repeated.
    async fn write(
        &self,
        path: &str,
        content: &Value,
        revision: Option<&str>,
        message: &str,
    ) -> Result<(), RepositoryError> {
        crate::retry::confirmed_write(self, path, content, revision, message).await
    }
}

/// Encode a document as pretty-printed JSON in standard base64.
pub(crate) fn encode_content(content: &Value) -> Result<String, RepositoryError> {
    let text = serde_json::to_string_pretty(content).map_err(|e| RepositoryError::Decode {
        path: "<outgoing>".into(),
        reason: e.to_string(),
    })?;
    Ok(STANDARD.encode(text))
}

/// Decode base64 file content into JSON. GitHub wraps base64 at 60 columns,
/// so whitespace is stripped first.
pub(crate) fn decode_content(path: &str, encoded: &str) -> Result<Value, RepositoryError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| RepositoryError::Decode {
            path: path.to_string(),
            reason: format!("base64: {e}"),
        })?;
    serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Decode {
        path: path.to_string(),
        reason: format!("json: {e}"),
    })
}

/// Turn a non-success response into [`RepositoryError::Api`].
pub(crate) async fn api_error(
    service: &'static str,
    endpoint: &str,
    resp: reqwest::Response,
) -> RepositoryError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    RepositoryError::Api {
        service,
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}
