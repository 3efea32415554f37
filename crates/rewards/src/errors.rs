//! Error types for the dispatch domain.
//!
//! [`EventRejection`] covers payloads the dispatcher refuses before any backend
//! call. [`WorkflowExecutionError`] is what a [`crate::WorkflowClient`] reports
//! when the backend workflow itself fails.

use thiserror::Error;

/// The trigger phrase a key-request comment must consist of.
pub const CREATE_KEY_COMMAND: &str = "createKey";

// ---------------------------------------------------------------------------
// Pre-dispatch rejections
// ---------------------------------------------------------------------------

/// A payload rejected before dispatch.
///
/// The `Display` strings are returned verbatim to the webhook sender. Neither
/// variant is retried; the sender's redelivery is the only retry path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventRejection {
    /// A key-request comment whose body is not exactly [`CREATE_KEY_COMMAND`].
    #[error("Invalid pr comment. Please comment 'createKey'.")]
    IntentInvalid,

    /// The identity field for the event kind is absent, not a string, or blank.
    #[error("Github username must be present.")]
    IdentityNotFound,
}

// ---------------------------------------------------------------------------
// Backend failures
// ---------------------------------------------------------------------------

/// A failure reported by the backend workflow engine.
///
/// `message` is the engine's human-readable explanation (e.g. the user already
/// has a key). When it is `None` the dispatcher substitutes a default that
/// names the workflow and the identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("workflow execution failed: {}", .message.as_deref().unwrap_or("no message"))]
pub struct WorkflowExecutionError {
    /// Engine-supplied message, if any.
    pub message: Option<String>,
}

impl WorkflowExecutionError {
    /// An error carrying the engine's message. Blank messages count as absent.
    pub fn with_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::without_message()
        } else {
            Self { message: Some(message) }
        }
    }

    /// An error with no usable message.
    pub fn without_message() -> Self {
        Self { message: None }
    }
}
