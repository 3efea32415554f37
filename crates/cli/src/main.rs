//! GitCoins webhook service entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: defaults, `gitcoins.toml`, then `GITCOINS_*`
//!    environment variables (see [`config`]).
//! 2. **Wire observability**: configure `tracing-subscriber` with a JSON or
//!    pretty console layer and an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: create the `HttpWorkflowClient` and inject
//!    it into the `WorkflowDispatcher`; the dispatcher is the only handle to
//!    the workflow engine and is shared by every request.
//! 4. **Serve**: bind the webhook listener and run until CTRL+C / SIGTERM.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use listener::{create_router, start_server, AppState};
use rewards::WorkflowDispatcher;
use tracing::{error, info};
use workflow_client::HttpWorkflowClient;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let telemetry = telemetry::init(&config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        engine = %config.workflow_engine_url,
        workflow_timeout_secs = config.workflow_timeout_secs,
        otlp = config.otlp_endpoint.is_some(),
        "starting GitCoins webhook service"
    );

    let result = run(&config).await;
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "webhook service failed");
    }

    telemetry.shutdown();
    result
}

async fn run(config: &Config) -> Result<()> {
    let addr = config.server_addr()?;

    let client = HttpWorkflowClient::new(config.to_client_config())
        .context("Failed to create workflow engine client")?;
    let dispatcher =
        WorkflowDispatcher::new(Arc::new(client)).with_timeout(config.workflow_timeout());

    let app = create_router(AppState::new(dispatcher), config.to_router_config());

    start_server(app, addr).await.with_context(|| format!("Webhook listener failed on {addr}"))
}
