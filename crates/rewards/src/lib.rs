//! Core dispatch domain for the GitCoins webhook service.
//!
//! This crate decides what a webhook delivery means and what to do about it:
//! which contributor it credits, whether it is actionable, which backend
//! workflow it triggers, and how the workflow's result reads to the sender.
//! Infrastructure crates implement the [`WorkflowClient`] port defined here;
//! they never add rules of their own.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no network or
//! file-system I/O. It defines *what* is needed; infrastructure crates define
//! *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `ContributorIdentity`, `WorkflowName` |
//! | [`types`] | `EventKind`, `RawEvent`, `DispatchRequest`, `WorkflowOutcome` |
//! | [`errors`] | `EventRejection`, `WorkflowExecutionError` |
//! | [`extract`] | Payload Extractor (pure) |
//! | [`dispatch`] | Workflow Dispatcher and the `WorkflowClient` port |
//!
//! ## Request flow
//!
//! ```text
//! RawEvent ──extract::prepare──▶ DispatchRequest ──WorkflowDispatcher::dispatch──▶ WorkflowOutcome
//!     │                                                   │
//!     └─▶ EventRejection (no backend call)                └─▶ WorkflowClient::invoke (once)
//! ```

pub mod dispatch;
pub mod errors;
pub mod extract;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use dispatch::{default_failure_message, timeout_message, WorkflowClient, WorkflowDispatcher};
pub use errors::{EventRejection, WorkflowExecutionError, CREATE_KEY_COMMAND};
pub use extract::{extract_identity, prepare, verify_key_request_intent};
pub use identifiers::{ContributorIdentity, WorkflowName};
pub use types::{DispatchRequest, EventKind, FailureKind, RawEvent, WorkflowOutcome};
