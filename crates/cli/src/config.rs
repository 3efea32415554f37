//! Service configuration.
//!
//! Loaded in priority order (highest first):
//! 1. `GITCOINS_`-prefixed environment variables (e.g. `GITCOINS_PORT`)
//! 2. `gitcoins.toml` in the working directory
//! 3. Built-in defaults
//!
//! The defaults run a local service against a local engine gateway.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use listener::RouterConfig;
use serde::{Deserialize, Serialize};
use workflow_client::WorkflowClientConfig;

const CONFIG_FILE: &str = "gitcoins.toml";
const ENV_PREFIX: &str = "GITCOINS_";

/// Console log encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Listener bind address.
    pub host: String,
    /// Listener bind port.
    pub port: u16,

    /// Base URL of the workflow engine gateway.
    pub workflow_engine_url: String,
    /// Bound on waiting for one workflow to settle, in seconds. `0` waits
    /// indefinitely and also lifts the whole-request timeout.
    pub workflow_timeout_secs: u64,
    /// Bound on connecting to the engine gateway, in seconds.
    pub engine_connect_timeout_secs: u64,

    /// Bound on handling one HTTP request, in seconds. Ignored when
    /// `workflow_timeout_secs` is `0`.
    pub request_timeout_secs: u64,
    /// Largest accepted webhook body, in bytes.
    pub max_body_bytes: usize,

    /// Console log encoding.
    pub log_format: LogFormat,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// OTLP gRPC endpoint for span export. Disabled when absent.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from defaults, `gitcoins.toml`, and the environment.
    pub fn load() -> Result<Self> {
        let config: Self = Self::figment().extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Listener socket address.
    pub fn server_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr).with_context(|| format!("Invalid server address '{addr}'"))
    }

    /// Dispatcher wait bound; `None` when disabled.
    pub fn workflow_timeout(&self) -> Option<Duration> {
        (self.workflow_timeout_secs > 0).then(|| Duration::from_secs(self.workflow_timeout_secs))
    }

    /// Settings for the engine gateway client.
    pub fn to_client_config(&self) -> WorkflowClientConfig {
        WorkflowClientConfig::new(self.workflow_engine_url.clone())
            .with_connect_timeout(Duration::from_secs(self.engine_connect_timeout_secs))
    }

    /// Settings for the HTTP router.
    ///
    /// An unbounded workflow wait must not be cut short by the router, so the
    /// request timeout only applies while the workflow wait is bounded.
    pub fn to_router_config(&self) -> RouterConfig {
        RouterConfig {
            request_timeout: self
                .workflow_timeout()
                .map(|_| Duration::from_secs(self.request_timeout_secs)),
            max_body_bytes: self.max_body_bytes,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        self.server_addr()?;

        workflow_client::parse_base_url(&self.workflow_engine_url)
            .context("workflow_engine_url must be an absolute http(s) URL")?;

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if let Some(workflow_timeout) = self.workflow_timeout() {
            if Duration::from_secs(self.request_timeout_secs) <= workflow_timeout {
                anyhow::bail!(
                    "request_timeout_secs must exceed workflow_timeout_secs so workflow expiry is reported"
                );
            }
        }

        if self.log_filter.trim().is_empty() {
            anyhow::bail!("log_filter must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workflow_engine_url: "http://127.0.0.1:10050".to_string(),
            workflow_timeout_secs: 60,
            engine_connect_timeout_secs: 5,
            request_timeout_secs: 90,
            max_body_bytes: 1024 * 1024,
            log_format: LogFormat::Pretty,
            log_filter: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}
