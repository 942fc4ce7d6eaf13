//! GitLab repository files API adapter.
//!
//! Projects are addressed by numeric ID and files by their URL-encoded path
//! on the `main` branch. Creation is a POST, update a PUT carrying the
//! `last_commit_id` of the version being replaced.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{api_error, decode_content, encode_content, Document, RepositoryError, StatusRepository};
use crate::retry::read_with_backoff;

/// Public GitLab REST API.
pub const DEFAULT_GITLAB_API_URL: &str = "https://gitlab.com/api/v4";

const SERVICE: &str = "GitLab";
const BRANCH: &str = "main";
const TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct FileResponse {
    content: String,
    last_commit_id: String,
}

/// One GitLab project accessed through the repository files API.
#[derive(Debug, Clone)]
pub struct GitLabRepository {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl GitLabRepository {
    /// Create an adapter for project `project_id` authenticated with `token`.
    pub fn new(base_url: &str, project_id: &str, token: &str) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "PRIVATE-TOKEN",
            HeaderValue::from_str(token)
                .map_err(|_| RepositoryError::Client("invalid access token characters".into()))?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| RepositoryError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        })
    }

    fn project_url(&self) -> String {
        format!("{}/projects/{}", self.base_url, self.project_id)
    }

    fn file_url(&self, path: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
        format!("{}/repository/files/{}", self.project_url(), encoded)
    }
}

#[async_trait]
impl StatusRepository for GitLabRepository {
    async fn check_access(&self) -> Result<(), RepositoryError> {
        let endpoint = self.project_url();
        let resp = read_with_backoff(&endpoint, || self.client.get(&endpoint).send()).await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RepositoryError::Inaccessible {
                service: SERVICE,
                repository: format!("project {}", self.project_id),
            }),
            _ => Err(api_error(SERVICE, &endpoint, resp).await),
        }
    }

    async fn read(&self, path: &str) -> Result<Option<Document>, RepositoryError> {
        let endpoint = self.file_url(path);
        let resp = read_with_backoff(&endpoint, || {
            self.client
                .get(&endpoint)
                .query(&[("ref", BRANCH)])
                .send()
        })
        .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(api_error(SERVICE, &endpoint, resp).await);
        }

        let body: FileResponse = resp.json().await.map_err(|e| RepositoryError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Document {
            content: decode_content(path, &body.content)?,
            revision: Some(body.last_commit_id),
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: &Value,
        revision: Option<&str>,
        message: &str,
    ) -> Result<(), RepositoryError> {
        let endpoint = self.file_url(path);
        let mut body = json!({
            "branch": BRANCH,
            "content": encode_content(content)?,
            "encoding": "base64",
            "commit_message": message,
        });
        if let Some(commit) = revision {
            body["last_commit_id"] = Value::String(commit.to_string());
        }

        let request = match revision {
            Some(_) => self.client.put(&endpoint),
            None => self.client.post(&endpoint),
        };
        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|source| RepositoryError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(RepositoryError::Conflict {
                path: path.to_string(),
            }),
            _ => Err(api_error(SERVICE, &endpoint, resp).await),
        }
    }
}
