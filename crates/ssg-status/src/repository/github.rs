//! GitHub contents API adapter.
//!
//! Files are addressed as `GET/PUT /repos/{owner}/{repo}/contents/{path}`.
//! Updates must carry the blob SHA of the version being replaced; a stale SHA
//! is answered with 409, which surfaces as [`RepositoryError::Conflict`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{api_error, decode_content, encode_content, Document, RepositoryError, StatusRepository};
use crate::retry::read_with_backoff;

/// Public GitHub REST API.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const SERVICE: &str = "GitHub";
const TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

/// One GitHub repository accessed through the contents API.
#[derive(Debug, Clone)]
pub struct GitHubRepository {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
}

impl GitHubRepository {
    /// Create an adapter for `owner/repo` authenticated with `token`.
    pub fn new(base_url: &str, owner: &str, repo: &str, token: &str) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| RepositoryError::Client("invalid access token characters".into()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("status-service-git"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| RepositoryError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.base_url, self.owner, self.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(), path)
    }
}

#[async_trait]
impl StatusRepository for GitHubRepository {
    async fn check_access(&self) -> Result<(), RepositoryError> {
        let endpoint = self.repo_url();
        let resp = read_with_backoff(&endpoint, || self.client.get(&endpoint).send()).await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RepositoryError::Inaccessible {
                service: SERVICE,
                repository: format!("{}/{}", self.owner, self.repo),
            }),
            _ => Err(api_error(SERVICE, &endpoint, resp).await),
        }
    }

    async fn read(&self, path: &str) -> Result<Option<Document>, RepositoryError> {
        let endpoint = self.contents_url(path);
        let resp = read_with_backoff(&endpoint, || self.client.get(&endpoint).send()).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(api_error(SERVICE, &endpoint, resp).await);
        }

        let body: ContentsResponse = resp.json().await.map_err(|e| RepositoryError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Document {
            content: decode_content(path, &body.content)?,
            revision: Some(body.sha),
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: &Value,
        revision: Option<&str>,
        message: &str,
    ) -> Result<(), RepositoryError> {
        let endpoint = self.contents_url(path);
        let mut body = json!({
            "message": message,
            "content": encode_content(content)?,
        });
        if let Some(sha) = revision {
            body["sha"] = Value::String(sha.to_string());
        }

        let resp = self
            .client
            .put(&endpoint)
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
