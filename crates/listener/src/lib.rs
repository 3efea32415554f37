//! GitCoins webhook receiver.
//!
//! Binds an HTTP server and accepts GitHub webhook payloads on one endpoint per
//! event kind, handing each to the [`rewards`] dispatcher:
//!
//! | Method/Path | GitHub webhook | Success |
//! |-------------|----------------|---------|
//! | `POST /api/git/create-key` | `pull_request_review_comment` / `issue_comment` | `201` key created |
//! | `POST /api/git/push-event` | `push` | `201` GitCoin issued |
//! | `POST /api/git/pr-event` | `pull_request_review` | `201` GitCoin issued |
//! | `GET /health` | (liveness probe) | `200` |
//!
//! Rejected payloads and failed workflows answer `400` with a plain-text
//! message; an expired workflow wait answers `504`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, body limits, request ids, response mapping,
//! and server lifecycle live here. The [`rewards`] crate decides what a
//! payload means; this crate only translates its answers to HTTP.
//!
//! Webhook signatures are not verified and deliveries are not de-duplicated.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod handlers;
pub mod server;

pub use error::WebhookError;
pub use server::{create_router, start_server, AppState, RouterConfig};
