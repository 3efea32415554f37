//! Mapping from dispatch failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rewards::EventRejection;
use thiserror::Error;

/// Every way a webhook request can fail after it reaches a handler.
///
/// The `Display` string is the response body, so it must be safe to show to
/// the webhook sender.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The payload was refused before dispatch.
    #[error(transparent)]
    Rejected(#[from] EventRejection),

    /// The workflow engine reported a failure.
    #[error("{0}")]
    Workflow(String),

    /// The workflow did not settle within the dispatcher's bound.
    #[error("{0}")]
    WorkflowTimedOut(String),
}

impl WebhookError {
    /// The status code returned for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(_) | Self::Workflow(_) => StatusCode::BAD_REQUEST,
            Self::WorkflowTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
