//! HTTP handlers for the webhook endpoints.
//!
//! Each event endpoint runs the same linear sequence:
//! validate → extract → dispatch → respond. Nothing escapes a handler as a
//! fault; every path ends in exactly one response.
//!
//! Bodies are taken as raw bytes and decoded lossily, so a payload that is not
//! UTF-8 (or not JSON) is answered with the extractor's `400`, not a transport
//! rejection.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rewards::{prepare, EventKind, FailureKind, RawEvent, WorkflowOutcome};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{server::AppState, WebhookError};

const DELIVERY_HEADER: &str = "x-github-delivery";
const EVENT_HEADER: &str = "x-github-event";

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> &'h str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("none")
}

/// `POST /api/git/create-key`: a comment asking for a signing key.
#[instrument(
    name = "create_key",
    skip(state, headers, body),
    fields(
        delivery_id = header_str(&headers, DELIVERY_HEADER),
        github_event = header_str(&headers, EVENT_HEADER),
        payload_size = body.len(),
    )
)]
pub async fn create_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), WebhookError> {
    handle_event(&state, EventKind::KeyRequest, &body).await
}

/// `POST /api/git/push-event`: a push to the repository.
#[instrument(
    name = "push_event",
    skip(state, headers, body),
    fields(
        delivery_id = header_str(&headers, DELIVERY_HEADER),
        github_event = header_str(&headers, EVENT_HEADER),
        payload_size = body.len(),
    )
)]
pub async fn push_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), WebhookError> {
    handle_event(&state, EventKind::Push, &body).await
}

/// `POST /api/git/pr-event`: a submitted pull request review.
#[instrument(
    name = "pr_event",
    skip(state, headers, body),
    fields(
        delivery_id = header_str(&headers, DELIVERY_HEADER),
        github_event = header_str(&headers, EVENT_HEADER),
        payload_size = body.len(),
    )
)]
pub async fn pr_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), WebhookError> {
    handle_event(&state, EventKind::ReviewApproval, &body).await
}

async fn handle_event(
    state: &AppState,
    kind: EventKind,
    body: &[u8],
) -> Result<(StatusCode, String), WebhookError> {
    let text = String::from_utf8_lossy(body);

    let request = prepare(RawEvent::new(kind, &text)).map_err(|rejection| {
        warn!(%kind, %rejection, "webhook payload rejected");
        WebhookError::from(rejection)
    })?;

    debug!(%kind, identity = %request.identity(), "dispatching workflow");

    match state.dispatcher.dispatch(&request).await {
        WorkflowOutcome::Success(message) => {
            info!(%kind, identity = %request.identity(), "{message}");
            Ok((StatusCode::CREATED, message))
        }
        WorkflowOutcome::Failure { kind: FailureKind::Rejected, message } => {
            Err(WebhookError::Workflow(message))
        }
        WorkflowOutcome::Failure { kind: FailureKind::TimedOut, message } => {
            Err(WebhookError::WorkflowTimedOut(message))
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct LivenessResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// `GET /health`: answers while the process is serving requests.
///
/// Does not contact the workflow engine.
pub async fn health() -> Response {
    let response = LivenessResponse {
        status: "alive",
        service: "gitcoins-webhooks",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
