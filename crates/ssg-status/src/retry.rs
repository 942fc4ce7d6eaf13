//! # Git Host Backoff
//!
//! Reads are idempotent and are repeated after a transport failure.
//!
//! Writes are not. A PUT that timed out may still have been committed by the
//! host, and sending it again would then be refused as a conflict (GitHub)
//! or as an existing file (GitLab). After a failed write attempt the file is
//! read back instead: if it already holds the intended content the write is
//! done, otherwise it is attempted again.
//!
//! Delays between attempts: 200ms, 400ms, 800ms.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::repository::{RepositoryError, StatusRepository};

const BACKOFF_MS: [u64; 3] = [200, 400, 800];

fn backoff() -> impl Iterator<Item = Duration> {
    BACKOFF_MS.into_iter().map(Duration::from_millis)
}

/// Send a GET, repeating it while the transport fails.
pub(crate) async fn read_with_backoff<F, Fut>(
    endpoint: &str,
    send: F,
) -> Result<reqwest::Response, RepositoryError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delays = backoff();
    loop {
        let source = match send().await {
            Ok(resp) => return Ok(resp),
            Err(source) => source,
        };
        let Some(delay) = delays.next() else {
            return Err(RepositoryError::Http {
                endpoint: endpoint.to_string(),
                source,
            });
        };
        tracing::warn!(endpoint, ?delay, error = %source, "git host read failed, retrying");
        tokio::time::sleep(delay).await;
    }
}

/// Write `content` to `path`, confirming attempts whose outcome is unknown.
pub(crate) async fn confirmed_write<R>(
    repo: &R,
    path: &str,
    content: &Value,
    revision: Option<&str>,
    message: &str,
) -> Result<(), RepositoryError>
where
    R: StatusRepository + ?Sized,
{
    let mut delays = backoff();
    loop {
        let err = match repo.put(path, content, revision, message).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_transport() => err,
            Err(err) => return Err(err),
        };
        let Some(delay) = delays.next() else {
            return Err(err);
        };
        tracing::warn!(path, ?delay, error = %err, "git host write outcome unknown");
        tokio::time::sleep(delay).await;

        match repo.read(path).await {
            Ok(Some(doc)) if doc.content == *content => {
                tracing::debug!(path, "write was committed before the failure");
                return Ok(());
            }
            Ok(_) => {}
            Err(read_err) => {
                tracing::warn!(path, error = %read_err, "could not read back write");
            }
        }
    }
}
