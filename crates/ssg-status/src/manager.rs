//! # Git-Hosted Status Manager
//!
//! Keeps bitstring status list credentials in a public status repository and
//! allocation bookkeeping in a private meta repository.
//!
//! ## Layout
//!
//! Status repository: one file per status list, named by its 10-character
//! list ID, so the file is published at `<site origin>/<list ID>`.
//!
//! Meta repository:
//!
//! - `config.json`: the allocation cursor (current list and next free index)
//!   of every status purpose.
//! - `credentials/<sha256(credential id)>.json`: the [`CredentialInfo`] of
//!   each allocated credential.
//!
//! ## Consistency
//!
//! Every mutating operation runs under one async mutex, so positions are never
//! handed out twice by this process. Repository writes carry the revision
//! that was read; a concurrent writer elsewhere surfaces as a conflict error
//! instead of a lost update.
//!
//! The meta repository is the source of truth and is written first:
//!
//! - Allocation reserves positions in `config.json` before publishing
//!   anything. A list a cursor points at is published on the next allocation
//!   if it is missing. A failure after the reservation leaves an unused gap
//!   in the list.
//! - A status change writes the credential record before the list bit. If
//!   the bit cannot be written the record is restored.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use ssg_core::{
    CredentialInfo, CredentialStatusKind, StatusError, StatusInfo, StatusPurpose,
    VerifiableCredential, SUPPORTED_STATUS_TYPE,
};
use tokio::sync::Mutex;

use crate::bitstring::{StatusList, STATUS_LIST_LENGTH};
use crate::error::ManagerError;
use crate::repository::{Document, StatusRepository};
use crate::StatusManager;

const CONFIG_PATH: &str = "config.json";
const LIST_ID_LENGTH: usize = 10;
const LIST_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LIST_ID_ATTEMPTS: usize = 5;

const CREDENTIALS_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";
const STATUS_LIST_TYPE: &str = "BitstringStatusList";
const STATUS_ENTRY_TYPE: &str = "BitstringStatusListEntry";

/// Where the next allocation for one purpose goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocationCursor {
    status_credential_id: String,
    next_index: usize,
}

/// Contents of `config.json` in the meta repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagerConfig {
    #[serde(default)]
    cursors: BTreeMap<StatusPurpose, AllocationCursor>,
}

/// Status manager backed by two git repositories.
pub struct GitStatusManager<R> {
    status_repo: R,
    meta_repo: R,
    site_origin: String,
    issuer: String,
    lock: Mutex<()>,
}

impl<R: StatusRepository> GitStatusManager<R> {
    /// `site_origin` is the public URL the status repository is served
    /// under; `issuer` is the DID recorded on status list credentials.
    pub fn new(
        status_repo: R,
        meta_repo: R,
        site_origin: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            status_repo,
            meta_repo,
            site_origin: site_origin.into().trim_end_matches('/').to_string(),
            issuer: issuer.into(),
            lock: Mutex::new(()),
        }
    }

    /// Check that both repositories are visible with the configured tokens
    /// and that the allocation state, if any, can be read.
    pub async fn verify_access(&self) -> Result<(), StatusError> {
        self.meta_repo.check_access().await.map_err(ManagerError::from)?;
        self.status_repo.check_access().await.map_err(ManagerError::from)?;
        self.read_config().await?;
        Ok(())
    }

    fn list_url(&self, list_id: &str) -> String {
        format!("{}/{}", self.site_origin, list_id)
    }

    async fn read_config(&self) -> Result<(ManagerConfig, Option<String>), ManagerError> {
        match self.meta_repo.read(CONFIG_PATH).await? {
            Some(doc) => Ok((parse(CONFIG_PATH, doc.content)?, doc.revision)),
            None => Ok((ManagerConfig::default(), None)),
        }
    }

    async fn read_info(&self, credential_id: &str) -> Result<Option<(CredentialInfo, Document)>, ManagerError> {
        let path = credential_path(credential_id);
        match self.meta_repo.read(&path).await? {
            Some(doc) => {
                let info = parse(&path, doc.content.clone())?;
                Ok(Some((info, doc)))
            }
            None => Ok(None),
        }
    }

    /// A random list ID not yet used in the status repository.
    async fn unused_list_id(&self) -> Result<String, ManagerError> {
        for _ in 0..LIST_ID_ATTEMPTS {
            let list_id = random_list_id();
            if self.status_repo.read(&list_id).await?.is_none() {
                return Ok(list_id);
            }
        }
        Err(ManagerError::Corrupt {
            path: self.site_origin.clone(),
            reason: "could not find an unused status list ID".into(),
        })
    }

    /// Publish an empty status list under `list_id` unless it exists.
    async fn ensure_list(&self, list_id: &str, purpose: StatusPurpose) -> Result<(), ManagerError> {
        if self.status_repo.read(list_id).await?.is_some() {
            return Ok(());
        }
        let credential = self.status_list_credential(list_id, purpose, &StatusList::new())?;
        self.status_repo
            .write(list_id, &credential, None, &format!("Create status list {list_id}"))
            .await?;
        tracing::info!(list_id = %list_id, purpose = %purpose, "published status list");
        Ok(())
    }

    fn status_list_credential(
        &self,
        list_id: &str,
        purpose: StatusPurpose,
        list: &StatusList,
    ) -> Result<Value, ManagerError> {
        let url = self.list_url(list_id);
        Ok(json!({
            "@context": [CREDENTIALS_V2_CONTEXT],
            "id": url,
            "type": ["VerifiableCredential", SUPPORTED_STATUS_TYPE],
            "issuer": self.issuer,
            "validFrom": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "credentialSubject": {
                "id": format!("{url}#list"),
                "type": STATUS_LIST_TYPE,
                "statusPurpose": purpose.as_str(),
                "encodedList": list.encode()?,
            },
        }))
    }

    fn status_entries(&self, info: &CredentialInfo) -> Vec<Value> {
        info.status_info
            .iter()
            .map(|(purpose, status)| {
                let url = self.list_url(&status.status_credential_id);
                json!({
                    "id": format!("{url}#{}", status.status_list_index),
                    "type": STATUS_ENTRY_TYPE,
                    "statusPurpose": purpose.as_str(),
                    "statusListIndex": status.status_list_index.to_string(),
                    "statusListCredential": url,
                })
            })
            .collect()
    }

    async fn allocate(&self, mut credential: VerifiableCredential) -> Result<VerifiableCredential, ManagerError> {
        let _guard = self.lock.lock().await;

        let credential_id = match credential.fields().get("id").cloned() {
            None => {
                let id = format!("urn:uuid:{}", uuid::Uuid::new_v4());
                credential.set_id(id.clone());
                id
            }
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(_) => return Err(ManagerError::InvalidCredentialId),
        };

        if let Some((info, _)) = self.read_info(&credential_id).await? {
            tracing::debug!(credential_id = %credential_id, "credential already allocated");
            credential.set_credential_status(self.status_entries(&info));
            return Ok(credential);
        }

        let (mut config, config_revision) = self.read_config().await?;
        let mut status_info = BTreeMap::new();
        for purpose in StatusPurpose::SUPPORTED {
            let needs_list = config
                .cursors
                .get(&purpose)
                .map_or(true, |cursor| cursor.next_index >= STATUS_LIST_LENGTH);
            if needs_list {
                let list_id = self.unused_list_id().await?;
                config.cursors.insert(
                    purpose,
                    AllocationCursor {
                        status_credential_id: list_id,
                        next_index: 0,
                    },
                );
            }
            let cursor = config
                .cursors
                .get_mut(&purpose)
                .ok_or_else(|| ManagerError::Corrupt {
                    path: CONFIG_PATH.into(),
                    reason: format!("missing {purpose} cursor"),
                })?;
            status_info.insert(
                purpose,
                StatusInfo {
                    status_credential_id: cursor.status_credential_id.clone(),
                    status_list_index: cursor.next_index,
                    valid: true,
                },
            );
            cursor.next_index += 1;
        }

        let info = CredentialInfo {
            id: credential_id.clone(),
            issuer: issuer_of(&credential),
            status_info,
        };

        self.meta_repo
            .write(
                CONFIG_PATH,
                &to_json(CONFIG_PATH, &config)?,
                config_revision.as_deref(),
                "Reserve status positions",
            )
            .await?;
        for (purpose, status) in &info.status_info {
            self.ensure_list(&status.status_credential_id, *purpose).await?;
        }
        let path = credential_path(&credential_id);
        self.meta_repo
            .write(
                &path,
                &to_json(&path, &info)?,
                None,
                &format!("Allocate status for {credential_id}"),
            )
            .await?;

        tracing::info!(credential_id = %credential_id, "allocated status positions");
        credential.set_credential_status(self.status_entries(&info));
        Ok(credential)
    }

    async fn apply(
        &self,
        credential_id: &str,
        kind: CredentialStatusKind,
    ) -> Result<CredentialInfo, ManagerError> {
        let _guard = self.lock.lock().await;

        let (info, doc) = self
            .read_info(credential_id)
            .await?
            .ok_or_else(|| ManagerError::CredentialNotFound(credential_id.to_string()))?;
        check_transition(&info, kind)?;

        let purpose = kind.purpose();
        let path = credential_path(credential_id);
        let set_bit = kind != CredentialStatusKind::Unsuspended;
        let mut updated = info.clone();
        let status = updated
            .status_info
            .get_mut(&purpose)
            .ok_or_else(|| ManagerError::Corrupt {
                path: path.clone(),
                reason: format!("no {purpose} status recorded"),
            })?;
        status.valid = !set_bit;
        let (list_id, index) = (status.status_credential_id.clone(), status.status_list_index);

        self.meta_repo
            .write(
                &path,
                &to_json(&path, &updated)?,
                doc.revision.as_deref(),
                &format!("Mark {credential_id} as {kind}"),
            )
            .await?;

        if let Err(err) = self.write_bit(&list_id, purpose, index, set_bit).await {
            self.restore_record(&path, &info).await;
            return Err(err);
        }

        tracing::info!(credential_id = %credential_id, status = %kind, "credential status updated");
        Ok(updated)
    }

    /// Put back a credential record whose list bit could not be written.
    async fn restore_record(&self, path: &str, info: &CredentialInfo) {
        let restored = async {
            let current = self.meta_repo.read(path).await?;
            let revision = current.and_then(|doc| doc.revision);
            self.meta_repo
                .write(path, &to_json(path, info)?, revision.as_deref(), "Restore status record")
                .await?;
            Ok::<(), ManagerError>(())
        };
        match restored.await {
            Ok(()) => tracing::warn!(credential_id = %info.id, "status change rolled back"),
            Err(err) => tracing::error!(
                credential_id = %info.id,
                error = %err,
                "status record no longer matches the published list"
            ),
        }
    }

    async fn write_bit(
        &self,
        list_id: &str,
        purpose: StatusPurpose,
        index: usize,
        value: bool,
    ) -> Result<(), ManagerError> {
        let doc = self
            .status_repo
            .read(list_id)
            .await?
            .ok_or_else(|| ManagerError::Corrupt {
                path: list_id.to_string(),
                reason: "status list referenced by credential is missing".into(),
            })?;
        let encoded = doc
            .content
            .pointer("/credentialSubject/encodedList")
            .and_then(Value::as_str)
            .ok_or_else(|| ManagerError::Corrupt {
                path: list_id.to_string(),
                reason: "missing credentialSubject.encodedList".into(),
            })?;

        let mut list = StatusList::decode(encoded)?;
        list.set(index, value)?;
        let credential = self.status_list_credential(list_id, purpose, &list)?;
        self.status_repo
            .write(
                list_id,
                &credential,
                doc.revision.as_deref(),
                &format!("Update status list {list_id}"),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<R: StatusRepository> StatusManager for GitStatusManager<R> {
    async fn allocate_supported_statuses(
        &self,
        credential: VerifiableCredential,
    ) -> Result<VerifiableCredential, StatusError> {
        Ok(self.allocate(credential).await?)
    }

    async fn revoke_credential(&self, credential_id: &str) -> Result<CredentialInfo, StatusError> {
        Ok(self.apply(credential_id, CredentialStatusKind::Revoked).await?)
    }

    async fn suspend_credential(&self, credential_id: &str) -> Result<CredentialInfo, StatusError> {
        Ok(self.apply(credential_id, CredentialStatusKind::Suspended).await?)
    }

    async fn unsuspend_credential(
        &self,
        credential_id: &str,
    ) -> Result<CredentialInfo, StatusError> {
        Ok(self.apply(credential_id, CredentialStatusKind::Unsuspended).await?)
    }

    async fn get_credential_info(&self, credential_id: &str) -> Result<CredentialInfo, StatusError> {
        let (info, _) = self
            .read_info(credential_id)
            .await?
            .ok_or_else(|| ManagerError::CredentialNotFound(credential_id.to_string()))?;
        Ok(info)
    }

    async fn get_status_credential(
        &self,
        status_credential_id: &str,
    ) -> Result<Value, StatusError> {
        let not_found = || ManagerError::StatusCredentialNotFound(status_credential_id.to_string());
        if !is_valid_list_id(status_credential_id) {
            return Err(not_found().into());
        }
        let doc = self
            .status_repo
            .read(status_credential_id)
            .await
            .map_err(ManagerError::from)?
            .ok_or_else(not_found)?;
        Ok(doc.content)
    }
}

fn check_transition(info: &CredentialInfo, kind: CredentialStatusKind) -> Result<(), ManagerError> {
    let id = &info.id;
    let reason = match kind {
        CredentialStatusKind::Revoked if info.is_revoked() => {
            format!("Credential with ID {id} has already been revoked.")
        }
        CredentialStatusKind::Suspended | CredentialStatusKind::Unsuspended if info.is_revoked() => {
            format!("Unable to {} credential with ID {id} because it has been revoked.", verb(kind))
        }
        CredentialStatusKind::Suspended if info.is_suspended() => {
            format!("Credential with ID {id} is already suspended.")
        }
        CredentialStatusKind::Unsuspended if !info.is_suspended() => {
            format!("Credential with ID {id} is not suspended.")
        }
        _ => return Ok(()),
    };
    Err(ManagerError::InvalidTransition(reason))
}

fn verb(kind: CredentialStatusKind) -> &'static str {
    match kind {
        CredentialStatusKind::Revoked => "revoke",
        CredentialStatusKind::Suspended => "suspend",
        CredentialStatusKind::Unsuspended => "unsuspend",
    }
}

/// Meta repository path of a credential's record. Hashing keeps arbitrary
/// credential IDs (URLs, URNs) out of file names.
fn credential_path(credential_id: &str) -> String {
    let digest = Sha256::digest(credential_id.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("credentials/{hex}.json")
}

fn random_list_id() -> String {
    let mut rng = rand::thread_rng();
    (0..LIST_ID_LENGTH)
        .map(|_| LIST_ID_CHARSET[rng.gen_range(0..LIST_ID_CHARSET.len())] as char)
        .collect()
}

fn is_valid_list_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn issuer_of(credential: &VerifiableCredential) -> Option<String> {
    match credential.fields().get("issuer")? {
        Value::String(issuer) => Some(issuer.clone()),
        Value::Object(issuer) => issuer.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn parse<T: DeserializeOwned>(path: &str, content: Value) -> Result<T, ManagerError> {
    serde_json::from_value(content).map_err(|e| ManagerError::Corrupt {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn to_json<T: Serialize>(path: &str, value: &T) -> Result<Value, ManagerError> {
    serde_json::to_value(value).map_err(|e| ManagerError::Corrupt {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
