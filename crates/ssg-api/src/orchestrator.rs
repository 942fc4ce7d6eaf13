//! # Status Orchestrator
//!
//! Sits between the HTTP handlers and the status manager capability. It
//! validates status values, delegates to the manager and turns every
//! status-update result into an [`OutcomeRecord`].
//!
//! ## Capability Lifecycle
//!
//! The orchestrator owns at most one [`SharedStatusManager`]. It is either
//! injected up front ([`StatusOrchestrator::with_manager`]) or built from
//! [`StatusManagerOptions`] on first use. First-time construction is
//! single-flight: concurrent first callers wait on one construction instead
//! of each building a manager. A failed construction is not cached.

use parking_lot::RwLock;
use serde_json::Value;
use ssg_core::{
    CredentialInfo, CredentialStatusKind, OutcomeRecord, StatusError, VerifiableCredential,
};
use ssg_status::{create_status_manager, SharedStatusManager, StatusManagerOptions};
use tokio::sync::Mutex;

/// Orchestrates status operations against one status manager.
pub struct StatusOrchestrator {
    manager: RwLock<Option<SharedStatusManager>>,
    init: Mutex<()>,
    options: Option<StatusManagerOptions>,
}

impl StatusOrchestrator {
    /// Build the manager from `options` on first use.
    pub fn new(options: StatusManagerOptions) -> Self {
        Self {
            manager: RwLock::new(None),
            init: Mutex::new(()),
            options: Some(options),
        }
    }

    /// Use an already constructed manager.
    pub fn with_manager(manager: SharedStatusManager) -> Self {
        Self {
            manager: RwLock::new(Some(manager)),
            init: Mutex::new(()),
            options: None,
        }
    }

    fn installed(&self) -> Option<SharedStatusManager> {
        self.manager.read().clone()
    }

    /// Return the status manager, constructing it if needed.
    ///
    /// An `override_manager` replaces whatever is installed. Without one, an
    /// installed manager is returned as-is.
    pub async fn ensure_initialized(
        &self,
        override_manager: Option<SharedStatusManager>,
    ) -> Result<SharedStatusManager, StatusError> {
        if let Some(manager) = override_manager {
            *self.manager.write() = Some(manager.clone());
            return Ok(manager);
        }
        if let Some(manager) = self.installed() {
            return Ok(manager);
        }

        let _guard = self.init.lock().await;
        if let Some(manager) = self.installed() {
            return Ok(manager);
        }
        let options = self
            .options
            .as_ref()
            .ok_or_else(|| StatusError::internal("No status manager has been configured."))?;
        let manager = create_status_manager(options).await?;
        *self.manager.write() = Some(manager.clone());
        Ok(manager)
    }

    /// Attach status list entries to `credential`, unless it already has some.
    pub async fn allocate_supported_statuses(
        &self,
        credential: VerifiableCredential,
    ) -> Result<VerifiableCredential, StatusError> {
        if credential.has_credential_status() {
            return Ok(credential);
        }
        let manager = self.ensure_initialized(None).await?;
        manager.allocate_supported_statuses(credential).await
    }

    /// Apply a status change. Never fails: every result is an outcome record.
    pub async fn update_status(&self, credential_id: &str, status: &str) -> OutcomeRecord {
        let kind = match status.parse::<CredentialStatusKind>() {
            Ok(kind) => kind,
            Err(unsupported) => return OutcomeRecord::new(400, unsupported.to_string()),
        };

        match self.apply(credential_id, kind).await {
            Ok(_) => OutcomeRecord::ok(kind.success_message()),
            Err(err) => {
                tracing::debug!(credential_id, status, error = %err, "status update failed");
                let code = err.code().filter(|c| (400..600).contains(c)).unwrap_or(500);
                OutcomeRecord::new(
                    code,
                    err.message_or_else(|| {
                        format!(
                            "Unable to apply status \"{status}\" to credential with ID \"{credential_id}\"."
                        )
                    }),
                )
            }
        }
    }

    async fn apply(
        &self,
        credential_id: &str,
        kind: CredentialStatusKind,
    ) -> Result<CredentialInfo, StatusError> {
        let manager = self.ensure_initialized(None).await?;
        match kind {
            CredentialStatusKind::Revoked => manager.revoke_credential(credential_id).await,
            CredentialStatusKind::Suspended => manager.suspend_credential(credential_id).await,
            CredentialStatusKind::Unsuspended => manager.unsuspend_credential(credential_id).await,
        }
    }

    pub async fn get_credential_info(&self, credential_id: &str) -> Result<CredentialInfo, StatusError> {
        let manager = self.ensure_initialized(None).await?;
        manager.get_credential_info(credential_id).await
    }

    pub async fn get_status_credential(
        &self,
        status_credential_id: &str,
    ) -> Result<Value, StatusError> {
        let manager = self.ensure_initialized(None).await?;
        manager.get_status_credential(status_credential_id).await
    }
}
