//! # ssg-core — Domain Types for the Credential Status Service
//!
//! The vocabulary shared by the status manager capability (`ssg-status`)
//! and the HTTP service (`ssg-api`). Nothing in this crate performs I/O.
//!
//! ## Key Types
//!
//! - [`VerifiableCredential`]: an opaque JSON object; only its `id` and
//!   `credentialStatus` fields are ever inspected.
//! - [`CredentialStatusKind`]: the closed set of status updates a client may
//!   request: revoked, suspended, unsuspended.
//! - [`StatusPurpose`]: the status lists every credential is allocated into.
//! - [`OutcomeRecord`]: the `{code, message}` pair returned by every status
//!   mutation, success or failure.
//! - [`StatusError`]: the failure carrier that crosses the capability
//!   boundary. Both fields are optional; consumers decide the fallbacks.
//!
//! ## Crate Policy
//!
//! - Leaf of the dependency DAG: no dependencies on other `ssg-*` crates.
//! - No `.unwrap()` outside tests.

pub mod credential;
pub mod error;
pub mod info;
pub mod outcome;
pub mod status;

pub use credential::{StatusUpdateEntry, StatusUpdateRequest, VerifiableCredential};
pub use error::StatusError;
pub use info::{CredentialInfo, StatusInfo};
pub use outcome::OutcomeRecord;
pub use status::{CredentialStatusKind, StatusPurpose, UnsupportedStatus};

/// The only status list type clients may target in update requests.
pub const SUPPORTED_STATUS_TYPE: &str = "BitstringStatusListCredential";
