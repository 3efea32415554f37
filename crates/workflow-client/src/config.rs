//! Connection settings for the workflow engine gateway.

use std::time::Duration;

/// Configuration for [`crate::HttpWorkflowClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowClientConfig {
    /// Base URL of the engine gateway, e.g. `http://127.0.0.1:10050`.
    pub base_url: String,
    /// Upper bound on establishing a TCP/TLS connection.
    ///
    /// This does not bound the workflow itself; see
    /// [`rewards::WorkflowDispatcher::with_timeout`].
    pub connect_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl WorkflowClientConfig {
    /// Default settings for the gateway at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Replaces the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for WorkflowClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:10050".to_string(),
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("gitcoins-webhooks/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
