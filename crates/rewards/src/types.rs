//! Shared value types for the dispatch domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types describe one
//! webhook delivery as it moves through the dispatcher: the raw event, the
//! validated dispatch request, and the outcome of the backend workflow.

use crate::{ContributorIdentity, WorkflowName};

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Identifies which webhook trigger fired.
///
/// The kind selects the extraction path, the backend workflow, and the
/// response templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A pull request comment asking for a signing key (`createKey`).
    KeyRequest,
    /// A push to the repository.
    Push,
    /// A submitted pull request review.
    ReviewApproval,
}

impl EventKind {
    /// All kinds, in endpoint order.
    pub const ALL: [EventKind; 3] = [Self::KeyRequest, Self::Push, Self::ReviewApproval];

    /// Returns the backend workflow this kind of event triggers.
    pub fn workflow(self) -> WorkflowName {
        match self {
            Self::KeyRequest => WorkflowName::CreateKey,
            Self::Push => WorkflowName::PushEvent,
            Self::ReviewApproval => WorkflowName::PullRequestReviewEvent,
        }
    }

    /// Returns the response body confirming a successful workflow for `identity`.
    pub fn success_message(self, identity: &ContributorIdentity) -> String {
        match self {
            Self::KeyRequest => format!("New public key generated for GitHub user: {identity}"),
            Self::Push => format!("GitCoin issued to: {identity} for a push."),
            Self::ReviewApproval => {
                format!("GitCoin issued to: {identity} for a pull request review.")
            }
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::KeyRequest => "key_request",
            Self::Push => "push",
            Self::ReviewApproval => "review_approval",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Raw events
// ---------------------------------------------------------------------------

/// An event payload exactly as delivered by the webhook sender, tagged with
/// the endpoint it arrived on.
///
/// The text is not assumed to be valid JSON; see [`crate::extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent<'a> {
    kind: EventKind,
    text: &'a str,
}

impl<'a> RawEvent<'a> {
    /// Wraps a payload received on the endpoint for `kind`.
    pub fn new(kind: EventKind, text: &'a str) -> Self {
        Self { kind, text }
    }

    /// The endpoint the payload arrived on.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The payload text.
    pub fn text(&self) -> &'a str {
        self.text
    }
}

// ---------------------------------------------------------------------------
// Dispatch requests
// ---------------------------------------------------------------------------

/// A validated (kind, identity) pair ready to be handed to the backend.
///
/// Only [`crate::extract::prepare`] builds these, so holding one proves that
/// the identity was extracted and, for [`EventKind::KeyRequest`], that the
/// intent gate passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    kind: EventKind,
    identity: ContributorIdentity,
}

impl DispatchRequest {
    pub(crate) fn new(kind: EventKind, identity: ContributorIdentity) -> Self {
        Self { kind, identity }
    }

    /// The event kind that produced this request.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The contributor to credit.
    pub fn identity(&self) -> &ContributorIdentity {
        &self.identity
    }

    /// The backend workflow to invoke.
    pub fn workflow(&self) -> WorkflowName {
        self.kind.workflow()
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a dispatch did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The workflow ran and reported an execution error.
    Rejected,
    /// The workflow did not settle within the configured bound.
    TimedOut,
}

/// The settled result of one dispatch. Produced once; never retried or cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The workflow completed. Carries the confirmation message.
    Success(String),
    /// The workflow failed. Carries the message to return to the sender.
    Failure {
        /// Distinguishes an engine rejection from an expired wait.
        kind: FailureKind,
        /// Backend message, or a kind-specific default.
        message: String,
    },
}

impl WorkflowOutcome {
    /// Returns `true` for [`WorkflowOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
