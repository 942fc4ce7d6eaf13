//! In-process repository for local development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{Document, RepositoryError, StatusRepository};

/// A repository held in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    files: Arc<RwLock<HashMap<String, (Value, u64)>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all stored files, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Current content of a file.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.files.read().get(path).map(|(content, _)| content.clone())
    }
}

#[async_trait]
impl StatusRepository for MemoryRepository {
    async fn check_access(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Option<Document>, RepositoryError> {
        Ok(self.files.read().get(path).map(|(content, version)| Document {
            content: content.clone(),
            revision: Some(version.to_string()),
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: &Value,
        revision: Option<&str>,
        _message: &str,
    ) -> Result<(), RepositoryError> {
        let mut files = self.files.write();
        let current = files.get(path).map(|(_, version)| version.to_string());
        if current.as_deref() != revision {
            return Err(RepositoryError::Conflict {
                path: path.to_string(),
            });
        }
        let next = files.get(path).map_or(1, |(_, version)| version + 1);
        files.insert(path.to_string(), (content.clone(), next));
        Ok(())
    }
}
