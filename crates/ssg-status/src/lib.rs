//! # ssg-status — Status Manager Capability
//!
//! The capability the credential status service delegates to. It owns
//! status list storage, allocation of status list positions to credentials,
//! and the bit flips behind revocation and suspension.
//!
//! ## Interface
//!
//! [`StatusManager`] is the boundary the HTTP service programs against. It is
//! object safe and shared as [`SharedStatusManager`] (`Arc<dyn StatusManager>`).
//! Every operation fails with [`ssg_core::StatusError`], so callers never see
//! backend-specific error types.
//!
//! ## Git-Hosted Implementation
//!
//! [`GitStatusManager`] keeps bitstring status list credentials in a public
//! *status repository* and allocation bookkeeping in a private *meta
//! repository*. Repositories are reached through the [`StatusRepository`]
//! trait:
//!
//! | Adapter | Backing service |
//! |---------|-----------------|
//! | [`GitHubRepository`] | GitHub contents API |
//! | [`GitLabRepository`] | GitLab repository files API |
//! | [`MemoryRepository`] | In-process map (local development, tests) |
//!
//! [`create_status_manager`] wires the adapters selected by
//! [`StatusManagerOptions`].

pub mod bitstring;
pub mod did;
pub mod error;
pub mod manager;
pub mod options;
pub mod repository;
pub(crate) mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use ssg_core::{CredentialInfo, StatusError, VerifiableCredential};

pub use bitstring::{StatusList, STATUS_LIST_LENGTH};
pub use error::ManagerError;
pub use manager::GitStatusManager;
pub use options::{GitHubOptions, GitLabOptions, GitService, GitServiceKind, StatusManagerOptions};
pub use repository::github::GitHubRepository;
pub use repository::gitlab::GitLabRepository;
pub use repository::memory::MemoryRepository;
pub use repository::{Document, RepositoryError, StatusRepository};

/// Status list allocation and mutation against a backing service.
///
/// Transition validity (e.g. no suspension after revocation) is enforced by
/// implementations, not by callers.
#[async_trait]
pub trait StatusManager: Send + Sync {
    /// Allocate a position in every supported status list and return the
    /// credential with `credentialStatus` entries attached.
    async fn allocate_supported_statuses(
        &self,
        credential: VerifiableCredential,
    ) -> Result<VerifiableCredential, StatusError>;

    /// Permanently revoke a credential.
    async fn revoke_credential(&self, credential_id: &str) -> Result<CredentialInfo, StatusError>;

    /// Suspend a credential.
    async fn suspend_credential(&self, credential_id: &str) -> Result<CredentialInfo, StatusError>;

    /// Lift a suspension.
    async fn unsuspend_credential(&self, credential_id: &str)
        -> Result<CredentialInfo, StatusError>;

    /// Status bookkeeping for one credential.
    async fn get_credential_info(&self, credential_id: &str) -> Result<CredentialInfo, StatusError>;

    /// The published status list credential with the given identifier.
    async fn get_status_credential(&self, status_credential_id: &str)
        -> Result<Value, StatusError>;
}

/// Process-wide handle to a status manager.
pub type SharedStatusManager = Arc<dyn StatusManager>;

/// Build the git-hosted status manager selected by `options`.
///
/// Derives the issuer DID from the configured seed and builds the repository
/// adapters for the selected service. Both repositories must be visible with
/// their tokens and the meta repository's configuration must be readable.
pub async fn create_status_manager(
    options: &StatusManagerOptions,
) -> Result<SharedStatusManager, StatusError> {
    let issuer = did::did_key_from_seed(&options.did_seed).map_err(ManagerError::from)?;
    let site_origin = options.service.site_origin();

    let manager: SharedStatusManager = match &options.service {
        GitService::GitHub(github) => {
            let base_url = options
                .api_base_url
                .as_deref()
                .unwrap_or(repository::github::DEFAULT_GITHUB_API_URL);
            let status_repo = GitHubRepository::new(
                base_url,
                &github.owner_account_name,
                &github.repo_name,
                &github.repo_access_token,
            )
            .map_err(ManagerError::from)?;
            let meta_repo = GitHubRepository::new(
                base_url,
                &github.owner_account_name,
                &github.meta_repo_name,
                &github.meta_repo_access_token,
            )
            .map_err(ManagerError::from)?;
            let manager = GitStatusManager::new(status_repo, meta_repo, site_origin, issuer);
            manager.verify_access().await?;
            Arc::new(manager)
        }
        GitService::GitLab(gitlab) => {
            let base_url = options
                .api_base_url
                .as_deref()
                .unwrap_or(repository::gitlab::DEFAULT_GITLAB_API_URL);
            let status_repo =
                GitLabRepository::new(base_url, &gitlab.repo_id, &gitlab.repo_access_token)
                    .map_err(ManagerError::from)?;
            let meta_repo = GitLabRepository::new(
                base_url,
                &gitlab.meta_repo_id,
                &gitlab.meta_repo_access_token,
            )
            .map_err(ManagerError::from)?;
            let manager = GitStatusManager::new(status_repo, meta_repo, site_origin, issuer);
            manager.verify_access().await?;
            Arc::new(manager)
        }
    };

    tracing::info!(
        service = options.service.kind().as_str(),
        "status manager initialized"
    );
    Ok(manager)
}
