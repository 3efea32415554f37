//! End-to-end router tests with a substitute workflow engine.
//!
//! Each test drives the real router through `tower::ServiceExt::oneshot` and
//! checks both the HTTP response and whether the engine was called.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use listener::{create_router, AppState, RouterConfig};
use rewards::{
    ContributorIdentity, WorkflowClient, WorkflowDispatcher, WorkflowExecutionError, WorkflowName,
};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Clone, Copy)]
enum Reply {
    Ok,
    Fail(Option<&'static str>),
    Hang,
}

struct RecordingEngine {
    reply: Reply,
    calls: Mutex<Vec<(WorkflowName, String)>>,
}

impl RecordingEngine {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self { reply, calls: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> Vec<(WorkflowName, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowClient for RecordingEngine {
    async fn invoke(
        &self,
        workflow: WorkflowName,
        identity: &ContributorIdentity,
    ) -> Result<(), WorkflowExecutionError> {
        self.calls.lock().unwrap().push((workflow, identity.to_string()));
        match self.reply {
            Reply::Ok => Ok(()),
            Reply::Fail(Some(message)) => Err(WorkflowExecutionError::with_message(message)),
            Reply::Fail(None) => Err(WorkflowExecutionError::without_message()),
            Reply::Hang => std::future::pending::<Result<(), WorkflowExecutionError>>().await,
        }
    }
}

fn app_with(engine: Arc<RecordingEngine>) -> Router {
    let dispatcher =
        WorkflowDispatcher::new(engine).with_timeout(Some(Duration::from_millis(50)));
    create_router(AppState::new(dispatcher), RouterConfig::default())
}

async fn post(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-GitHub-Delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, String::from_utf8(bytes.to_vec()).expect("response body is UTF-8"))
}

// ---------------------------------------------------------------------------
// create-key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_key_succeeds_for_the_command_comment() {
    let engine = RecordingEngine::new(Reply::Ok);
    let payload = json!({
        "action": "created",
        "comment": { "body": "createKey", "user": { "login": "carol" } }
    });

    let (status, body) = post(app_with(engine.clone()), "/api/git/create-key", payload.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "New public key generated for GitHub user: carol");
    assert_eq!(engine.calls(), vec![(WorkflowName::CreateKey, "carol".to_string())]);
}

#[tokio::test]
async fn create_key_rejects_other_comments_without_dispatch() {
    for comment in ["createkey", "createKey please", " createKey", ""] {
        let engine = RecordingEngine::new(Reply::Ok);
        let payload = json!({ "comment": { "body": comment, "user": { "login": "carol" } } });

        let (status, body) =
            post(app_with(engine.clone()), "/api/git/create-key", payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid pr comment. Please comment 'createKey'.");
        assert!(engine.calls().is_empty(), "comment {comment:?} must not dispatch");
    }
}

#[tokio::test]
async fn create_key_without_login_is_missing_username() {
    let engine = RecordingEngine::new(Reply::Ok);
    let payload = json!({ "comment": { "body": "createKey", "user": {} } });

    let (status, body) = post(app_with(engine.clone()), "/api/git/create-key", payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Github username must be present.");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn create_key_credits_only_the_author_of_the_command_comment() {
    let engine = RecordingEngine::new(Reply::Ok);
    let payload = json!({
        "comment": { "body": "createKey", "user": {} },
        "issue": { "comment": { "body": "hi", "user": { "login": "mallory" } } }
    });

    let (status, body) = post(app_with(engine.clone()), "/api/git/create-key", payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Github username must be present.");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn create_key_failure_without_message_uses_default() {
    let engine = RecordingEngine::new(Reply::Fail(None));
    let payload = json!({ "comment": { "body": "createKey", "user": { "login": "carol" } } });

    let (status, body) = post(app_with(engine), "/api/git/create-key", payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Could not create new public key for GitHub user: carol");
}

// ---------------------------------------------------------------------------
// push-event
// ---------------------------------------------------------------------------

#[tokio::test]
async fn push_event_issues_a_gitcoin() {
    let engine = RecordingEngine::new(Reply::Ok);

    let (status, body) =
        post(app_with(engine.clone()), "/api/git/push-event", r#"{"pusher":{"name":"alice"}}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "GitCoin issued to: alice for a push.");
    assert_eq!(engine.calls(), vec![(WorkflowName::PushEvent, "alice".to_string())]);
}

#[tokio::test]
async fn push_event_without_pusher_is_missing_username() {
    let engine = RecordingEngine::new(Reply::Ok);

    let (status, body) =
        post(app_with(engine.clone()), "/api/git/push-event", r#"{"sender":{"login":"alice"}}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Github username must be present.");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn push_event_ignores_the_comment_gate() {
    let engine = RecordingEngine::new(Reply::Ok);
    let payload = json!({ "comment": { "body": "hello" }, "pusher": { "name": "alice" } });

    let (status, _) = post(app_with(engine), "/api/git/push-event", payload.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn non_utf8_and_non_json_bodies_degrade_to_bad_request() {
    let engine = RecordingEngine::new(Reply::Ok);

    let (status, body) =
        post(app_with(engine.clone()), "/api/git/push-event", vec![0xff, 0xfe, 0x00, 0x7b]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Github username must be present.");

    let (status, _) = post(app_with(engine.clone()), "/api/git/push-event", "pusher name alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn push_event_timeout_is_gateway_timeout() {
    let engine = RecordingEngine::new(Reply::Hang);

    let (status, body) =
        post(app_with(engine), "/api/git/push-event", r#"{"pusher":{"name":"alice"}}"#).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, "Timed out waiting for PushEventFlow for GitHub user: alice");
}

#[tokio::test]
async fn unbounded_workflow_wait_is_not_cut_off_by_the_router() {
    let engine = RecordingEngine::new(Reply::Hang);
    let dispatcher = WorkflowDispatcher::new(engine.clone()).with_timeout(None);
    let config = RouterConfig { request_timeout: None, ..RouterConfig::default() };
    let app = create_router(AppState::new(dispatcher), config);

    let request = Request::builder()
        .method("POST")
        .uri("/api/git/push-event")
        .body(Body::from(r#"{"pusher":{"name":"alice"}}"#))
        .unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(200), app.oneshot(request)).await;

    assert!(waited.is_err(), "request should still be waiting on the engine");
    assert_eq!(engine.calls(), vec![(WorkflowName::PushEvent, "alice".to_string())]);
}

// ---------------------------------------------------------------------------
// pr-event
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pr_event_issues_a_gitcoin() {
    let engine = RecordingEngine::new(Reply::Ok);

    let (status, body) =
        post(app_with(engine.clone()), "/api/git/pr-event", r#"{"review":{"user":{"login":"bob"}}}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "GitCoin issued to: bob for a pull request review.");
    assert_eq!(engine.calls(), vec![(WorkflowName::PullRequestReviewEvent, "bob".to_string())]);
}

#[tokio::test]
async fn pr_event_surfaces_engine_message() {
    let engine = RecordingEngine::new(Reply::Fail(Some("duplicate reward")));

    let (status, body) =
        post(app_with(engine.clone()), "/api/git/pr-event", r#"{"review":{"user":{"login":"bob"}}}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "duplicate reward");
    assert_eq!(engine.calls().len(), 1);
}

#[tokio::test]
async fn pr_event_failure_without_message_uses_default() {
    let engine = RecordingEngine::new(Reply::Fail(None));

    let (_, body) =
        post(app_with(engine), "/api/git/pr-event", r#"{"review":{"user":{"login":"bob"}}}"#).await;

    assert_eq!(body, "Could not complete pull request review flow for GitHub user: bob");
}

// ---------------------------------------------------------------------------
// Router surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oversized_bodies_are_refused() {
    let engine = RecordingEngine::new(Reply::Ok);
    let dispatcher = WorkflowDispatcher::new(engine.clone());
    let config = RouterConfig { max_body_bytes: 64, ..RouterConfig::default() };
    let app = create_router(AppState::new(dispatcher), config);

    let payload = json!({ "pusher": { "name": "alice" }, "padding": "x".repeat(256) });
    let (status, _) = post(app, "/api/git/push-event", payload.to_string()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn responses_are_plain_text() {
    let app = app_with(RecordingEngine::new(Reply::Ok));
    let request = Request::builder()
        .method("POST")
        .uri("/api/git/push-event")
        .body(Body::from(r#"{"pusher":{"name":"alice"}}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"), "{content_type}");
}

#[tokio::test]
async fn health_reports_alive() {
    let app = app_with(RecordingEngine::new(Reply::Ok));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&bytes).expect("health response is JSON");
    assert_eq!(health["status"], "alive");
    assert_eq!(health["service"], "gitcoins-webhooks");
}

#[tokio::test]
async fn webhook_routes_only_accept_post() {
    let app = app_with(RecordingEngine::new(Reply::Ok));
    let request = Request::builder().uri("/api/git/push-event").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
