//! GitCoins workflow engine client adapter.
//!
//! Implements the [`rewards::WorkflowClient`] trait against the workflow
//! engine's HTTP gateway: a JSON request/response protocol in which each
//! registered workflow is started by name and the response is returned only
//! once the workflow has settled.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction, serialisation, connection handling,
//! and transport error logging all live here. The [`rewards`] crate sees only
//! [`rewards::WorkflowClient`].
//!
//! ## Protocol
//!
//! | Request | Meaning |
//! |---------|---------|
//! | `POST {base_url}/workflows/{WorkflowName}` with `{"identity": "<login>"}` | Run the workflow and wait |
//!
//! | Response | Result |
//! |----------|--------|
//! | any `2xx` | `Ok(())` |
//! | other status, body `{"message": "..."}` | `WorkflowExecutionError` with the message |
//! | other status, no usable message | `WorkflowExecutionError` without a message |
//! | connection / transport failure | `WorkflowExecutionError` without a message (detail is logged) |
//!
//! No request timeout is set on the reqwest client: the dispatcher owns the
//! wait bound, so a slow workflow is cut off in one place only.

mod config;

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Url;
use rewards::{ContributorIdentity, WorkflowClient, WorkflowExecutionError, WorkflowName};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub use config::WorkflowClientConfig;

/// Errors raised while constructing an [`HttpWorkflowClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("Invalid workflow engine URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    identity: &'a str,
}

#[derive(Debug, Deserialize)]
struct EngineErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// [`WorkflowClient`] backed by the workflow engine's HTTP gateway.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpWorkflowClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpWorkflowClient {
    /// Creates a client for the gateway at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the URL does not parse or is
    /// not http(s), and [`ClientError::Build`] if reqwest rejects the settings.
    pub fn new(config: WorkflowClientConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.base_url)?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn workflow_url(&self, workflow: WorkflowName) -> String {
        format!("{}/workflows/{}", self.base_url.as_str().trim_end_matches('/'), workflow)
    }
}

/// Parses a gateway base URL, accepting only absolute http(s) URLs.
///
/// # Errors
///
/// Returns [`ClientError::InvalidBaseUrl`] when `raw` does not parse or uses
/// another scheme.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw)
        .map_err(|e| ClientError::InvalidBaseUrl { url: raw.to_string(), reason: e.to_string() })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[async_trait]
impl WorkflowClient for HttpWorkflowClient {
    async fn invoke(
        &self,
        workflow: WorkflowName,
        identity: &ContributorIdentity,
    ) -> Result<(), WorkflowExecutionError> {
        let url = self.workflow_url(workflow);
        let started = Instant::now();

        debug!(%workflow, %identity, %url, "starting workflow");

        let response = match self
            .client
            .post(&url)
            .json(&InvokeRequest { identity: identity.as_str() })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(%workflow, %identity, %url, error = %e, "workflow engine unreachable");
                return Err(WorkflowExecutionError::without_message());
            }
        };

        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status.is_success() {
            debug!(%workflow, %identity, status = status.as_u16(), elapsed_ms, "workflow settled");
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%workflow, error = %e, "failed to read workflow engine error body");
                String::new()
            }
        };

        let message = serde_json::from_str::<EngineErrorBody>(&body).ok().and_then(|b| b.message);

        warn!(
            %workflow,
            %identity,
            status = status.as_u16(),
            elapsed_ms,
            has_message = message.is_some(),
            "workflow engine reported failure"
        );

        Err(match message {
            Some(message) => WorkflowExecutionError::with_message(message),
            None => WorkflowExecutionError::without_message(),
        })
    }
}
