//! # Service Configuration
//!
//! [`AppConfig::from_env`] is the only place the process environment is read.
//! Everything downstream receives the frozen [`AppConfig`].
//!
//! ## Variables
//!
//! | Variable | Default | Notes |
//! |----------|---------|-------|
//! | `PORT` | `4008` | |
//! | `CRED_STATUS_SERVICE` | required | `github` or `gitlab` |
//! | `CRED_STATUS_REPO_NAME` | required | |
//! | `CRED_STATUS_META_REPO_NAME` | required | |
//! | `CRED_STATUS_OWNER_ACCOUNT_NAME` | required | |
//! | `CRED_STATUS_REPO_ACCESS_TOKEN` | required | |
//! | `CRED_STATUS_META_REPO_ACCESS_TOKEN` | required | |
//! | `CRED_STATUS_REPO_ID` | required for `gitlab` | |
//! | `CRED_STATUS_META_REPO_ID` | required for `gitlab` | |
//! | `CRED_STATUS_DID_SEED` | required | |
//! | `CRED_STATUS_API_URL` | service default | self-hosted GitLab |
//! | `CONSOLE_LOG_LEVEL` | `silly` | |
//! | `LOG_LEVEL` | `silly` | level of `ALL_LOG_FILE` |
//! | `ERROR_LOG_FILE` | unset | |
//! | `ALL_LOG_FILE` | unset | |
//! | `ENABLE_ACCESS_LOGGING` | `true` | |
//! | `ENABLE_HTTPS_FOR_DEV` | `false` | |

use std::path::PathBuf;
use std::str::FromStr;

use ssg_status::options::UnsupportedService;
use ssg_status::{GitHubOptions, GitLabOptions, GitService, GitServiceKind, StatusManagerOptions};
use thiserror::Error;
use tracing::Level;

const DEFAULT_PORT: u16 = 4008;

/// Configuration errors. All are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// The backing service selector is not supported.
    #[error(transparent)]
    UnsupportedService(#[from] UnsupportedService),

    /// A variable is set to an unusable value.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Log level vocabulary accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Http,
    Verbose,
    Debug,
    Silly,
}

impl LogLevel {
    /// The tracing level events must reach to be logged.
    pub fn tracing_level(&self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Http | Self::Verbose | Self::Debug => Level::DEBUG,
            Self::Silly => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "http" => Ok(Self::Http),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            "silly" => Ok(Self::Silly),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

/// Logging destinations and levels.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub console_level: LogLevel,
    pub log_level: LogLevel,
    pub error_log_file: Option<PathBuf>,
    pub all_log_file: Option<PathBuf>,
    pub enable_access_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: LogLevel::Silly,
            log_level: LogLevel::Silly,
            error_log_file: None,
            all_log_file: None,
            enable_access_logging: true,
        }
    }
}

/// Process configuration. Secrets are redacted from `Debug` output by the
/// status manager options.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub status: StatusManagerOptions,
    pub logging: LoggingConfig,
    pub enable_https_for_dev: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let service_kind: GitServiceKind = required("CRED_STATUS_SERVICE")?.parse()?;

        let owner_account_name = required("CRED_STATUS_OWNER_ACCOUNT_NAME")?;
        let repo_name = required("CRED_STATUS_REPO_NAME")?;
        let meta_repo_name = required("CRED_STATUS_META_REPO_NAME")?;
        let repo_access_token = required("CRED_STATUS_REPO_ACCESS_TOKEN")?;
        let meta_repo_access_token = required("CRED_STATUS_META_REPO_ACCESS_TOKEN")?;

        let service = match service_kind {
            GitServiceKind::GitHub => GitService::GitHub(GitHubOptions {
                owner_account_name,
                repo_name,
                meta_repo_name,
                repo_access_token,
                meta_repo_access_token,
            }),
            GitServiceKind::GitLab => GitService::GitLab(GitLabOptions {
                owner_account_name,
                repo_name,
                repo_id: required("CRED_STATUS_REPO_ID")?,
                meta_repo_name,
                meta_repo_id: required("CRED_STATUS_META_REPO_ID")?,
                repo_access_token,
                meta_repo_access_token,
            }),
        };

        let status = StatusManagerOptions {
            service,
            did_seed: required("CRED_STATUS_DID_SEED")?,
            api_base_url: optional("CRED_STATUS_API_URL"),
        };

        let port = match optional("PORT") {
            Some(value) => value.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                value: value.clone(),
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let defaults = LoggingConfig::default();
        let logging = LoggingConfig {
            console_level: parse_level("CONSOLE_LOG_LEVEL", optional("CONSOLE_LOG_LEVEL"), defaults.console_level)?,
            log_level: parse_level("LOG_LEVEL", optional("LOG_LEVEL"), defaults.log_level)?,
            error_log_file: optional("ERROR_LOG_FILE").map(PathBuf::from),
            all_log_file: optional("ALL_LOG_FILE").map(PathBuf::from),
            enable_access_logging: parse_bool(optional("ENABLE_ACCESS_LOGGING"), true),
        };

        Ok(Self {
            port,
            status,
            logging,
            enable_https_for_dev: parse_bool(optional("ENABLE_HTTPS_FOR_DEV"), false),
        })
    }
}

fn parse_level(
    var: &'static str,
    value: Option<String>,
    default: LogLevel,
) -> Result<LogLevel, ConfigError> {
    match value {
        Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
            var,
            value,
            reason,
        }),
        None => Ok(default),
    }
}

/// Lenient boolean parsing; unrecognised values fall back to `default`.
pub fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()).as_deref() {
        Some("true" | "t" | "yes" | "y" | "1") => true,
        Some("false" | "f" | "no" | "n" | "0") => false,
        _ => default,
    }
}
