//! Workflow dispatch: hand a validated request to the backend engine and
//! normalise whatever comes back into a [`WorkflowOutcome`].
//!
//! ## Port
//!
//! [`WorkflowClient`] is the only view this crate has of the engine. The
//! `workflow-client` crate implements it over HTTP; tests substitute their
//! own.
//!
//! ## Waiting
//!
//! The caller awaits the workflow until it settles. The wait is bounded by
//! [`WorkflowDispatcher::with_timeout`]; expiry produces
//! [`FailureKind::TimedOut`]. There are no retries.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::{
    ContributorIdentity, DispatchRequest, EventKind, FailureKind, WorkflowExecutionError,
    WorkflowName, WorkflowOutcome,
};

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Invokes a named workflow on the backend engine and waits for it to settle.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait WorkflowClient: Send + Sync {
    /// Runs `workflow` for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowExecutionError`] when the workflow fails or cannot be
    /// reached. Transport detail belongs in the implementation's logs, not in
    /// the error message.
    async fn invoke(
        &self,
        workflow: WorkflowName,
        identity: &ContributorIdentity,
    ) -> Result<(), WorkflowExecutionError>;
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Message used when the engine fails without explaining why.
pub fn default_failure_message(kind: EventKind, identity: &ContributorIdentity) -> String {
    match kind {
        EventKind::KeyRequest => format!("Could not create new public key for GitHub user: {identity}"),
        EventKind::Push => format!("Could not complete push flow for GitHub user: {identity}"),
        EventKind::ReviewApproval => {
            format!("Could not complete pull request review flow for GitHub user: {identity}")
        }
    }
}

/// Message used when the wait for `kind`'s workflow expires.
pub fn timeout_message(kind: EventKind, identity: &ContributorIdentity) -> String {
    format!("Timed out waiting for {} for GitHub user: {identity}", kind.workflow())
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Dispatches validated requests to the engine through an injected client.
///
/// Cheap to clone; clones share the client.
#[derive(Clone)]
pub struct WorkflowDispatcher {
    client: Arc<dyn WorkflowClient>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for WorkflowDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowDispatcher").field("timeout", &self.timeout).finish_non_exhaustive()
    }
}

impl WorkflowDispatcher {
    /// Creates a dispatcher that waits for workflows without a bound.
    pub fn new(client: Arc<dyn WorkflowClient>) -> Self {
        Self { client, timeout: None }
    }

    /// Bounds the wait for each workflow. `None` removes the bound.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the workflow for `request` and waits for it to settle.
    ///
    /// The backend is invoked exactly once. Failures are logged at error
    /// level before being returned.
    #[instrument(
        name = "dispatch",
        skip(self, request),
        fields(
            kind = %request.kind(),
            workflow = %request.workflow(),
            identity = %request.identity(),
        )
    )]
    pub async fn dispatch(&self, request: &DispatchRequest) -> WorkflowOutcome {
        let kind = request.kind();
        let identity = request.identity();
        let call = self.client.invoke(request.workflow(), identity);

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    let message = timeout_message(kind, identity);
                    error!(timeout_ms = limit.as_millis() as u64, "{message}");
                    return WorkflowOutcome::Failure { kind: FailureKind::TimedOut, message };
                }
            },
            None => call.await,
        };

        match result {
            Ok(()) => {
                info!("workflow completed");
                WorkflowOutcome::Success(kind.success_message(identity))
            }
            Err(e) => {
                let message = e
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| default_failure_message(kind, identity));
                error!("{message}");
                WorkflowOutcome::Failure { kind: FailureKind::Rejected, message }
            }
        }
    }
}
