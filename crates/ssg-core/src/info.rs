//! # Credential Status Records
//!
//! What the status manager remembers about each allocated credential: for
//! every [`StatusPurpose`], which status list credential holds its bit, at
//! which index, and whether the credential is still valid for that purpose.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::status::StatusPurpose;

/// Position and state of a credential in one status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    /// Identifier of the status list credential (last path segment of its URL).
    pub status_credential_id: String,
    /// Bit index inside the list.
    pub status_list_index: usize,
    /// `false` once the bit for this purpose is set.
    pub valid: bool,
}

/// Everything the status manager records about one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialInfo {
    /// Credential identifier.
    pub id: String,
    /// Issuer of the credential, when it could be read from the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Status list positions, keyed by purpose.
    pub status_info: BTreeMap<StatusPurpose, StatusInfo>,
}

impl CredentialInfo {
    /// Status info for one purpose.
    pub fn status(&self, purpose: StatusPurpose) -> Option<&StatusInfo> {
        self.status_info.get(&purpose)
    }

    /// Whether the credential has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.status(StatusPurpose::Revocation)
            .is_some_and(|info| !info.valid)
    }

    /// Whether the credential is currently suspended.
    pub fn is_suspended(&self) -> bool {
        self.status(StatusPurpose::Suspension)
            .is_some_and(|info| !info.valid)
    }
}
