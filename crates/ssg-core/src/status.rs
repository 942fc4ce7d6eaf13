//! # Status Kinds and Purposes
//!
//! Two closed enumerations:
//!
//! - [`CredentialStatusKind`] is what a client asks for in a status update
//!   (`revoked`, `suspended`, `unsuspended`).
//! - [`StatusPurpose`] names the status lists a credential is allocated into
//!   (`revocation`, `suspension`).
//!
//! Revocation is one-way: there is no `unrevoked` kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status update requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatusKind {
    /// Permanently invalidate the credential.
    Revoked,
    /// Temporarily invalidate the credential.
    Suspended,
    /// Lift a suspension.
    Unsuspended,
}

impl CredentialStatusKind {
    /// All supported kinds.
    pub const ALL: [CredentialStatusKind; 3] = [Self::Revoked, Self::Suspended, Self::Unsuspended];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revoked => "revoked",
            Self::Suspended => "suspended",
            Self::Unsuspended => "unsuspended",
        }
    }

    /// Message reported to the client once the backend applied the update.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Revoked => "Credential successfully revoked.",
            Self::Suspended => "Credential successfully suspended.",
            Self::Unsuspended => "Credential successfully unsuspended.",
        }
    }

    /// The status list this kind writes to.
    pub fn purpose(&self) -> StatusPurpose {
        match self {
            Self::Revoked => StatusPurpose::Revocation,
            Self::Suspended | Self::Unsuspended => StatusPurpose::Suspension,
        }
    }
}

impl fmt::Display for CredentialStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status value outside [`CredentialStatusKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported credential status: \"{0}\"")]
pub struct UnsupportedStatus(pub String);

impl FromStr for CredentialStatusKind {
    type Err = UnsupportedStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revoked" => Ok(Self::Revoked),
            "suspended" => Ok(Self::Suspended),
            "unsuspended" => Ok(Self::Unsuspended),
            other => Err(UnsupportedStatus(other.to_string())),
        }
    }
}

/// Purpose of a bitstring status list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPurpose {
    /// Bit set means the credential is revoked.
    Revocation,
    /// Bit set means the credential is suspended.
    Suspension,
}

impl StatusPurpose {
    /// Every purpose a credential is allocated into.
    pub const SUPPORTED: [StatusPurpose; 2] = [Self::Revocation, Self::Suspension];

    /// Wire name of the purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revocation => "revocation",
            Self::Suspension => "suspension",
        }
    }
}

impl fmt::Display for StatusPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revocation" => Ok(Self::Revocation),
            "suspension" => Ok(Self::Suspension),
            other => Err(format!("unknown status purpose: {other}")),
        }
    }
}
