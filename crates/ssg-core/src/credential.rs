//! # Credentials and Update Requests
//!
//! [`VerifiableCredential`] wraps the raw JSON object a client submits. The
//! service never validates credential structure; it only reads `id` and
//! checks for `credentialStatus`. Serialization is transparent so a
//! credential that passes through untouched comes back byte-for-byte equal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding allocated status list entries.
pub const CREDENTIAL_STATUS_FIELD: &str = "credentialStatus";

/// An opaque verifiable credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiableCredential(Map<String, Value>);

impl VerifiableCredential {
    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Whether the credential has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The credential `id`, when present as a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Set the credential `id`.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert("id".to_string(), Value::String(id.into()));
    }

    /// The `credentialStatus` field, if any.
    pub fn credential_status(&self) -> Option<&Value> {
        self.0.get(CREDENTIAL_STATUS_FIELD)
    }

    /// Whether a status has already been allocated.
    pub fn has_credential_status(&self) -> bool {
        self.credential_status().is_some()
    }

    /// Attach allocated status list entries.
    pub fn set_credential_status(&mut self, entries: Vec<Value>) {
        self.0
            .insert(CREDENTIAL_STATUS_FIELD.to_string(), Value::Array(entries));
    }

    /// Read access to the underlying fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Body of `POST /credentials/status`.
///
/// Every field is optional so that shape errors surface as 400 responses
/// from the handler rather than as deserialization rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    /// Identifier of the credential whose status changes.
    #[serde(default)]
    pub credential_id: Option<String>,
    /// Requested change; exactly the first element is honoured.
    #[serde(default)]
    pub credential_status: Option<Vec<StatusUpdateEntry>>,
}

/// One requested status change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateEntry {
    /// Status list type, e.g. `BitstringStatusListCredential`.
    #[serde(rename = "type", default)]
    pub status_type: Option<String>,
    /// Requested status value, e.g. `revoked`.
    #[serde(default)]
    pub status: Option<String>,
}
