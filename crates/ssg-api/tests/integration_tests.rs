//! Integration tests for the ssg-api router.
//!
//! Every test builds the real application with [`ssg_api::app`] and drives
//! it with `tower::ServiceExt::oneshot`. The status manager is a fake
//! injected through `StatusOrchestrator::with_manager`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use ssg_api::{AppState, StatusOrchestrator};
use ssg_core::{CredentialInfo, StatusError, StatusInfo, StatusPurpose, VerifiableCredential};
use ssg_status::{SharedStatusManager, StatusManager};
use tower::ServiceExt;

const CREDENTIAL_ID: &str = "urn:uuid:951b475e-b795-43bc-ba8f-a2d01efd2eb1";
const LIST_URL: &str = "https://digitalcredentials.github.io/credential-status-jc-test/XA5AAK1PV4";

// ── Fakes ────────────────────────────────────────────────────────────

/// Knows one credential and one status list; records every call.
#[derive(Default)]
struct FakeManager {
    calls: Mutex<Vec<String>>,
    failure: Option<StatusError>,
}

impl FakeManager {
    fn failing(err: StatusError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(err),
        })
    }

    fn record(&self, call: String) -> Result<(), StatusError> {
        self.calls.lock().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn info(&self, id: &str, revoked: bool) -> Result<CredentialInfo, StatusError> {
        if id != CREDENTIAL_ID {
            return Err(StatusError::not_found(format!(
                "Unable to find credential with ID {id}"
            )));
        }
        let mut status_info = BTreeMap::new();
        status_info.insert(
            StatusPurpose::Revocation,
            StatusInfo {
                status_credential_id: "XA5AAK1PV4".into(),
                status_list_index: 2,
                valid: !revoked,
            },
        );
        Ok(CredentialInfo {
            id: id.to_string(),
            issuer: None,
            status_info,
        })
    }
}

#[async_trait]
impl StatusManager for FakeManager {
    async fn allocate_supported_statuses(
        &self,
        mut credential: VerifiableCredential,
    ) -> Result<VerifiableCredential, StatusError> {
        self.record("allocate".into())?;
        credential.set_credential_status(vec![json!({
            "id": format!("{LIST_URL}#2"),
            "type": "BitstringStatusListEntry",
            "statusPurpose": "revocation",
            "statusListIndex": "2",
            "statusListCredential": LIST_URL,
        })]);
        Ok(credential)
    }

    async fn revoke_credential(&self, id: &str) -> Result<CredentialInfo, StatusError> {
        self.record(format!("revoke {id}"))?;
        self.info(id, true)
    }

    async fn suspend_credential(&self, id: &str) -> Result<CredentialInfo, StatusError> {
        self.record(format!("suspend {id}"))?;
        self.info(id, false)
    }

    async fn unsuspend_credential(&self, id: &str) -> Result<CredentialInfo, StatusError> {
        self.record(format!("unsuspend {id}"))?;
        self.info(id, false)
    }

    async fn get_credential_info(&self, id: &str) -> Result<CredentialInfo, StatusError> {
        self.record(format!("info {id}"))?;
        self.info(id, false)
    }

    async fn get_status_credential(&self, id: &str) -> Result<Value, StatusError> {
        self.record(format!("status-credential {id}"))?;
        if id != "XA5AAK1PV4" {
            return Err(StatusError::not_found(format!(
                "Unable to find status credential with ID {id}"
            )));
        }
        Ok(json!({
            "id": LIST_URL,
            "type": ["VerifiableCredential", "BitstringStatusListCredential"],
            "credentialSubject": {"type": "BitstringStatusList", "statusPurpose": "revocation"}
        }))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn test_app(manager: Arc<FakeManager>) -> Router {
    let manager: SharedStatusManager = manager;
    let state = AppState::new(StatusOrchestrator::with_manager(manager)).with_access_logging(false);
    ssg_api::app(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn update_request(credential_id: &str, status: &str) -> Value {
    json!({
        "credentialId": credential_id,
        "credentialStatus": [{"type": "BitstringStatusListCredential", "status": status}]
    })
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// ── GET / ────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check() {
    let manager = Arc::new(FakeManager::default());
    let resp = test_app(manager.clone()).oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"message": "status-service-git server status: ok."})
    );
    assert!(manager.calls().is_empty());
}

// ── POST /credentials/status/allocate ────────────────────────────────

#[tokio::test]
async fn allocate_attaches_status() {
    let manager = Arc::new(FakeManager::default());
    let vc = json!({
        "@context": ["https://www.w3.org/ns/credentials/v2"],
        "id": CREDENTIAL_ID,
        "type": ["VerifiableCredential"],
        "issuer": "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
        "credentialSubject": {"name": "Jane Doe"}
    });

    let resp = test_app(manager.clone())
        .oneshot(post_json("/credentials/status/allocate", &vc))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["credentialStatus"][0]["statusListCredential"], LIST_URL);
    assert_eq!(body["credentialSubject"], vc["credentialSubject"]);
    assert_eq!(manager.calls(), vec!["allocate"]);
}

#[tokio::test]
async fn allocate_with_existing_status_is_unchanged() {
    let manager = Arc::new(FakeManager::default());
    let raw = r#"{"id":"urn:uuid:1","type":["VerifiableCredential"],"credentialStatus":[{"id":"https://example.com/status/1#7","type":"BitstringStatusListEntry","statusPurpose":"revocation","statusListIndex":"7","statusListCredential":"https://example.com/status/1"}],"issuer":"did:key:z6Mk"}"#;

    let req = Request::builder()
        .method("POST")
        .uri("/credentials/status/allocate")
        .header("content-type", "application/json")
        .body(Body::from(raw))
        .unwrap();
    let resp = test_app(manager.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, raw.as_bytes());
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn allocate_rejects_empty_bodies() {
    let bodies = [
        Request::builder()
            .method("POST")
            .uri("/credentials/status/allocate")
            .body(Body::empty())
            .unwrap(),
        post_json("/credentials/status/allocate", &json!({})),
        post_json("/credentials/status/allocate", &json!([1, 2])),
        Request::builder()
            .method("POST")
            .uri("/credentials/status/allocate")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    ];

    for req in bodies {
        let manager = Arc::new(FakeManager::default());
        let resp = test_app(manager.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({"code": 400, "message": "A Verifiable Credential must be provided in the body."})
        );
        assert!(manager.calls().is_empty());
    }
}

#[tokio::test]
async fn allocate_failure_keeps_backend_code() {
    let manager = FakeManager::failing(StatusError::new(503, "GitHub is unavailable"));
    let resp = test_app(manager)
        .oneshot(post_json("/credentials/status/allocate", &json!({"id": "urn:uuid:1"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 503, "message": "GitHub is unavailable"})
    );
}

#[tokio::test]
async fn allocate_failure_without_details_uses_fallbacks() {
    let manager = FakeManager::failing(StatusError::from_parts(None, None));
    let resp = test_app(manager)
        .oneshot(post_json("/credentials/status/allocate", &json!({"id": "urn:uuid:1"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 500, "message": "Unable to allocate status position."})
    );
}

// ── POST /credentials/status ─────────────────────────────────────────

#[tokio::test]
async fn revoke_succeeds() {
    let manager = Arc::new(FakeManager::default());
    let resp = test_app(manager.clone())
        .oneshot(post_json("/credentials/status", &update_request(CREDENTIAL_ID, "revoked")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 200, "message": "Credential successfully revoked."})
    );
    assert_eq!(manager.calls(), vec![format!("revoke {CREDENTIAL_ID}")]);
}

#[tokio::test]
async fn suspend_and_unsuspend_succeed() {
    for (status, message) in [
        ("suspended", "Credential successfully suspended."),
        ("unsuspended", "Credential successfully unsuspended."),
    ] {
        let resp = test_app(Arc::new(FakeManager::default()))
            .oneshot(post_json("/credentials/status", &update_request(CREDENTIAL_ID, status)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["message"], message);
    }
}

#[tokio::test]
async fn revoking_unknown_credential_is_404() {
    let resp = test_app(Arc::new(FakeManager::default()))
        .oneshot(post_json("/credentials/status", &update_request("kj09ij", "revoked")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 404);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Unable to find credential with ID"));
}

#[tokio::test]
async fn unsupported_status_value_is_400() {
    let manager = Arc::new(FakeManager::default());
    let resp = test_app(manager.clone())
        .oneshot(post_json("/credentials/status", &update_request(CREDENTIAL_ID, "unrevoked")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 400, "message": "Unsupported credential status: \"unrevoked\""})
    );
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn update_requires_credential_id_and_status() {
    let bodies = [
        json!({"credentialStatus": [{"type": "BitstringStatusListCredential", "status": "revoked"}]}),
        json!({"credentialId": CREDENTIAL_ID}),
        json!({"credentialId": CREDENTIAL_ID, "credentialStatus": []}),
        json!({}),
    ];
    for body in bodies {
        let manager = Arc::new(FakeManager::default());
        let resp = test_app(manager.clone())
            .oneshot(post_json("/credentials/status", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            body_json(resp).await["message"],
            "A status update request must be provided in the body."
        );
        assert!(manager.calls().is_empty());
    }
}

#[tokio::test]
async fn update_requires_supported_status_type() {
    let manager = Arc::new(FakeManager::default());
    let body = json!({
        "credentialId": CREDENTIAL_ID,
        "credentialStatus": [{"type": "StatusList2021Credential", "status": "revoked"}]
    });
    let resp = test_app(manager.clone())
        .oneshot(post_json("/credentials/status", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["message"],
        "BitstringStatusListCredential is the only supported status type."
    );
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn invalid_transition_is_reported_with_backend_code() {
    let manager = FakeManager::failing(StatusError::bad_request(
        "Credential with ID urn:uuid:1 has already been revoked.",
    ));
    let resp = test_app(manager)
        .oneshot(post_json("/credentials/status", &update_request("urn:uuid:1", "revoked")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["message"],
        "Credential with ID urn:uuid:1 has already been revoked."
    );
}

#[tokio::test]
async fn update_failure_body_code_matches_http_status() {
    for code in [200, 302, 1000] {
        let manager = FakeManager::failing(StatusError::new(code, "odd backend code"));
        let resp = test_app(manager)
            .oneshot(post_json("/credentials/status", &update_request("urn:uuid:1", "suspended")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "code {code}");
        assert_eq!(
            body_json(resp).await,
            json!({"code": 500, "message": "odd backend code"})
        );
    }
}

// ── GET /credentials/{credential_id} ─────────────────────────────────

#[tokio::test]
async fn credential_info_is_returned() {
    let resp = test_app(Arc::new(FakeManager::default()))
        .oneshot(get(&format!("/credentials/{CREDENTIAL_ID}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], CREDENTIAL_ID);
    assert_eq!(body["statusInfo"]["revocation"]["statusListIndex"], 2);
    assert_eq!(body["statusInfo"]["revocation"]["valid"], true);
}

#[tokio::test]
async fn unknown_credential_info_passes_error_through() {
    let resp = test_app(Arc::new(FakeManager::default()))
        .oneshot(get("/credentials/kj09ij"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 404, "message": "Unable to find credential with ID kj09ij"})
    );
}

// ── GET /{status_credential_id} ──────────────────────────────────────

#[tokio::test]
async fn status_credential_is_returned() {
    let manager = Arc::new(FakeManager::default());
    let resp = test_app(manager.clone()).oneshot(get("/XA5AAK1PV4")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["id"], LIST_URL);
    assert_eq!(manager.calls(), vec!["status-credential XA5AAK1PV4"]);
}

#[tokio::test]
async fn unknown_status_credential_is_404() {
    let resp = test_app(Arc::new(FakeManager::default()))
        .oneshot(get("/ZZZZZZZZZZ"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await["message"],
        "Unable to find status credential with ID ZZZZZZZZZZ"
    );
}

#[tokio::test]
async fn backend_failure_without_code_is_500() {
    let manager = FakeManager::failing(StatusError::message_only("rate limited"));
    let resp = test_app(manager).oneshot(get("/XA5AAK1PV4")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(resp).await,
        json!({"code": 500, "message": "rate limited"})
    );
}

// ── Unmatched paths ──────────────────────────────────────────────────

#[tokio::test]
async fn unknown_paths_are_404() {
    let requests = [
        get("/unknown/path"),
        post_json("/unknown/path", &json!({})),
        get("/credentials/status/allocate"),
        Request::builder()
            .method("DELETE")
            .uri("/credentials/kj09ij")
            .body(Body::empty())
            .unwrap(),
        post_json("/XA5AAK1PV4", &json!({})),
    ];

    for req in requests {
        let manager = Arc::new(FakeManager::default());
        let uri = req.uri().clone();
        let resp = test_app(manager.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            body_json(resp).await,
            json!({"code": 404, "message": "An invalid path was requested."})
        );
        assert!(manager.calls().is_empty());
    }
}

// ── CORS ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn cors_allows_any_origin() {
    let req = Request::builder()
        .uri("/")
        .header("origin", "https://wallet.example.org")
        .body(Body::empty())
        .unwrap();
    let resp = test_app(Arc::new(FakeManager::default())).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
