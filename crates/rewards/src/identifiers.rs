//! Newtype domain identifiers.
//!
//! Every identity the dispatcher handles is a distinct type rather than a bare
//! `String`, so a username can never be passed where a workflow name is
//! expected (and vice versa).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// Values are trimmed; blank input yields None.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from the trimmed value, returning
            /// `None` if nothing but whitespace remains.
            pub fn new(value: impl AsRef<str>) -> Option<Self> {
                let v = value.as_ref().trim();
                if v.is_empty() { None } else { Some(Self(v.to_owned())) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The external (GitHub) username credited with the triggering action.
    ///
    /// Never empty or whitespace-only; absence is modelled as `Option::None`
    /// by the extractor, not as an empty identity.
    ContributorIdentity
}

// ---------------------------------------------------------------------------
// Workflow names
// ---------------------------------------------------------------------------

/// Names a transactional workflow hosted by the backend engine.
///
/// The string forms are the engine's registered flow names and appear on the
/// wire (see the `workflow-client` crate) and in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowName {
    /// Creates a signing key bound to a GitHub user.
    #[serde(rename = "CreateKeyFlow")]
    CreateKey,
    /// Issues a GitCoin for a push.
    #[serde(rename = "PushEventFlow")]
    PushEvent,
    /// Issues a GitCoin for a pull request review.
    #[serde(rename = "PullRequestReviewEventFlow")]
    PullRequestReviewEvent,
}

impl WorkflowName {
    /// Returns the engine's registered name for this workflow.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateKey => "CreateKeyFlow",
            Self::PushEvent => "PushEventFlow",
            Self::PullRequestReviewEvent => "PullRequestReviewEventFlow",
        }
    }
}

impl std::fmt::Display for WorkflowName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
