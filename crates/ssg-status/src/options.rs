//! # Status Manager Options
//!
//! Parameters for constructing the git-hosted status manager. The backing
//! service is a closed choice between GitHub and GitLab; each variant carries
//! exactly the parameters it needs. Custom `Debug` implementations redact
//! access tokens so options can be logged safely.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Backing service selector as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitServiceKind {
    /// `github`
    GitHub,
    /// `gitlab`
    GitLab,
}

impl GitServiceKind {
    /// Configuration name of the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }
}

/// The configured backing service is neither `github` nor `gitlab`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Encountered unsupported credential status service: {0}")]
pub struct UnsupportedService(pub String);

impl FromStr for GitServiceKind {
    type Err = UnsupportedService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            other => Err(UnsupportedService(other.to_string())),
        }
    }
}

impl fmt::Display for GitServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repositories and tokens for a GitHub-hosted status list.
#[derive(Clone)]
pub struct GitHubOptions {
    /// Account (user or organization) owning both repositories.
    pub owner_account_name: String,
    /// Public repository holding status list credentials.
    pub repo_name: String,
    /// Private repository holding allocation bookkeeping.
    pub meta_repo_name: String,
    /// Token with write access to the status repository.
    pub repo_access_token: String,
    /// Token with write access to the meta repository.
    pub meta_repo_access_token: String,
}

impl fmt::Debug for GitHubOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubOptions")
            .field("owner_account_name", &self.owner_account_name)
            .field("repo_name", &self.repo_name)
            .field("meta_repo_name", &self.meta_repo_name)
            .field("repo_access_token", &"[REDACTED]")
            .field("meta_repo_access_token", &"[REDACTED]")
            .finish()
    }
}

/// Repositories and tokens for a GitLab-hosted status list.
///
/// GitLab addresses projects by numeric ID; the names are still needed to
/// build the GitLab Pages URL the status credentials are published under.
#[derive(Clone)]
pub struct GitLabOptions {
    /// Account (user or group) owning both projects.
    pub owner_account_name: String,
    /// Public project holding status list credentials.
    pub repo_name: String,
    /// Project ID of the status repository.
    pub repo_id: String,
    /// Private project holding allocation bookkeeping.
    pub meta_repo_name: String,
    /// Project ID of the meta repository.
    pub meta_repo_id: String,
    /// Token with write access to the status repository.
    pub repo_access_token: String,
    /// Token with write access to the meta repository.
    pub meta_repo_access_token: String,
}

impl fmt::Debug for GitLabOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabOptions")
            .field("owner_account_name", &self.owner_account_name)
            .field("repo_name", &self.repo_name)
            .field("repo_id", &self.repo_id)
            .field("meta_repo_name", &self.meta_repo_name)
            .field("meta_repo_id", &self.meta_repo_id)
            .field("repo_access_token", &"[REDACTED]")
            .field("meta_repo_access_token", &"[REDACTED]")
            .finish()
    }
}

/// The backing service and its parameters.
#[derive(Debug, Clone)]
pub enum GitService {
    GitHub(GitHubOptions),
    GitLab(GitLabOptions),
}

impl GitService {
    /// Which service this is.
    pub fn kind(&self) -> GitServiceKind {
        match self {
            Self::GitHub(_) => GitServiceKind::GitHub,
            Self::GitLab(_) => GitServiceKind::GitLab,
        }
    }

    /// Origin under which status list credentials are published (GitHub or
    /// GitLab Pages for the status repository).
    pub fn site_origin(&self) -> String {
        match self {
            Self::GitHub(o) => format!("https://{}.github.io/{}", o.owner_account_name, o.repo_name),
            Self::GitLab(o) => format!("https://{}.gitlab.io/{}", o.owner_account_name, o.repo_name),
        }
    }
}

/// Everything needed to construct a status manager.
#[derive(Clone)]
pub struct StatusManagerOptions {
    /// Backing service selection.
    pub service: GitService,
    /// Seed of the Ed25519 key the issuer DID is derived from.
    pub did_seed: String,
    /// Overrides the service's public API URL (self-hosted GitLab, tests).
    pub api_base_url: Option<String>,
}

impl fmt::Debug for StatusManagerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusManagerOptions")
            .field("service", &self.service)
            .field("did_seed", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}
