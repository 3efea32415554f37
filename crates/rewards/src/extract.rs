//! Payload extraction: decide whether a raw event is actionable and who to
//! credit for it.
//!
//! Everything here is pure. The payload is parsed as JSON, but no schema is
//! imposed on it: each event kind names a short key path (e.g.
//! `pusher.name`) and the extractor accepts that path wherever it first
//! appears in the document, searching breadth-first so the shallowest match
//! wins. Text that is not JSON, a missing path, a non-string leaf, or a blank
//! value all degrade to "not found"; nothing in this module returns a parse
//! error.
//!
//! Key requests are anchored on a single comment: the shallowest `comment`
//! object in the document supplies both the command checked by the intent gate
//! and the login credited for it.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::debug;

use crate::{
    errors::CREATE_KEY_COMMAND, ContributorIdentity, DispatchRequest, EventKind, EventRejection,
    RawEvent,
};

const COMMENT_KEY: &str = "comment";
const COMMENT_AUTHOR_PATH: &[&str] = &["user", "login"];

/// The key path leading to the identity field for `kind`.
pub fn identity_path(kind: EventKind) -> &'static [&'static str] {
    match kind {
        EventKind::KeyRequest => &["comment", "user", "login"],
        EventKind::Push => &["pusher", "name"],
        EventKind::ReviewApproval => &["review", "user", "login"],
    }
}

/// Returns `true` only if the payload's comment body is exactly the
/// `createKey` command.
///
/// The comparison is case-sensitive and untrimmed; `"createKey "` and
/// `"createkey"` are both refused.
pub fn verify_key_request_intent(text: &str) -> bool {
    let Some(document) = parse(text) else {
        return false;
    };
    key_request_comment(&document).and_then(|comment| comment.get("body")).and_then(Value::as_str)
        == Some(CREATE_KEY_COMMAND)
}

/// Extracts the contributor identity for `kind`, or `None` if the expected
/// field is absent, not a string, or blank after trimming.
///
/// For key requests the login is read from the same comment the intent gate
/// inspects, never from another comment elsewhere in the payload.
pub fn extract_identity(text: &str, kind: EventKind) -> Option<ContributorIdentity> {
    let document = parse(text)?;
    let login = match kind {
        EventKind::KeyRequest => key_request_comment(&document)
            .and_then(|comment| resolve(comment, COMMENT_AUTHOR_PATH))
            .and_then(Value::as_str),
        EventKind::Push | EventKind::ReviewApproval => find_str(&document, identity_path(kind)),
    };
    login.and_then(ContributorIdentity::new)
}

/// Validates `event` and turns it into a [`DispatchRequest`].
///
/// Key requests must first pass the intent gate; identity extraction is not
/// attempted for a comment that is not the `createKey` command.
///
/// # Errors
///
/// - [`EventRejection::IntentInvalid`] for a key request whose comment is not
///   the command.
/// - [`EventRejection::IdentityNotFound`] when no identity can be extracted.
pub fn prepare(event: RawEvent<'_>) -> Result<DispatchRequest, EventRejection> {
    let kind = event.kind();

    if kind == EventKind::KeyRequest && !verify_key_request_intent(event.text()) {
        debug!(%kind, "comment is not the createKey command");
        return Err(EventRejection::IntentInvalid);
    }

    let identity = extract_identity(event.text(), kind).ok_or_else(|| {
        debug!(%kind, path = %identity_path(kind).join("."), "identity field not found");
        EventRejection::IdentityNotFound
    })?;

    Ok(DispatchRequest::new(kind, identity))
}

fn parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// The shallowest `comment` object in the document.
fn key_request_comment(document: &Value) -> Option<&Value> {
    find_first(document, |node| node.get(COMMENT_KEY).filter(|comment| comment.is_object()))
}

/// Breadth-first search for the first node from which `path` resolves to a
/// string.
fn find_str<'v>(document: &'v Value, path: &[&str]) -> Option<&'v str> {
    find_first(document, |node| resolve(node, path).and_then(Value::as_str))
}

/// Breadth-first search returning the first `Some` that `probe` yields.
fn find_first<'v, T>(
    document: &'v Value,
    mut probe: impl FnMut(&'v Value) -> Option<T>,
) -> Option<T> {
    let mut queue = VecDeque::from([document]);

    while let Some(node) = queue.pop_front() {
        if let Some(found) = probe(node) {
            return Some(found);
        }
        match node {
            Value::Object(map) => queue.extend(map.values()),
            Value::Array(items) => queue.extend(items.iter()),
            _ => {}
        }
    }

    None
}

fn resolve<'v>(node: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(node, |current, key| current.get(*key))
}
