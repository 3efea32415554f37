//! HTTP server setup and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation (`X-Request-Id` on every response)
//! 2. Request/response tracing
//! 3. Whole-request timeout (`408` on expiry), when configured
//! 4. Body size limit on webhook routes (`413` on excess)
//! 5. Handler execution
//!
//! # Graceful Shutdown
//!
//! On CTRL+C or SIGTERM the server stops accepting connections and lets
//! in-flight webhook requests finish before returning.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use rewards::WorkflowDispatcher;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::handlers;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub(crate) dispatcher: WorkflowDispatcher,
}

impl AppState {
    /// Wraps the dispatcher every request will use.
    pub fn new(dispatcher: WorkflowDispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Router-level limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Upper bound on handling one request, workflow wait included. `None`
    /// leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    /// Largest accepted webhook body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { request_timeout: Some(Duration::from_secs(90)), max_body_bytes: 1024 * 1024 }
    }
}

/// Creates the router with the webhook endpoints, health probe, and
/// middleware.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let webhook_routes = Router::new()
        .route("/create-key", post(handlers::create_key))
        .route("/push-event", post(handlers::push_event))
        .route("/pr-event", post(handlers::pr_event))
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/git", webhook_routes);

    let router = match config.request_timeout {
        Some(limit) => {
            router.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limit))
        }
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Adds an `X-Request-Id` header to every response and records the same id
/// on a span enclosing the request, so handler logs carry it.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut response =
        next.run(req).instrument(info_span!("request", request_id = %request_id)).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", header_value);
    }

    response
}

/// Binds `addr` and serves `app` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound or the server
/// fails while running.
pub async fn start_server(app: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(addr = %actual_addr, "webhook listener ready");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("webhook listener stopped");
    Ok(())
}

/// Waits for CTRL+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight webhook requests to complete");
}
