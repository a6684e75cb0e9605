//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Construct the shared retry orchestrator from configuration
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::loader::ConfigError;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::proxy::orchestrator::RetryOrchestrator;
use crate::proxy::retry::RetryPolicy;
use crate::proxy::rotation::{BackendTarget, HostRotator};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RetryOrchestrator>,
}

/// HTTP server hosting the retrying proxy handler.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server whose retry predicate is compiled from the config's
    /// `retry_on_statuses` / `retry_on_transport_error` rules.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        let policy = RetryPolicy::from_config(&config.retry);
        Self::with_policy(config, policy)
    }

    /// Create a server with an explicit retry policy (arbitrary predicate).
    pub fn with_policy(config: ProxyConfig, policy: RetryPolicy) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let targets: Vec<BackendTarget> =
            config.upstream.hosts.iter().map(BackendTarget::from).collect();
        let rotator = HostRotator::new(targets)
            .map_err(|_| ConfigError::Validation(vec![ValidationError::EmptyHostPool]))?;

        let orchestrator = Arc::new(RetryOrchestrator::new(
            policy,
            Arc::new(rotator),
            &config.timeouts,
            config.listener.max_body_bytes,
        ));

        let router = Self::build_router(AppState { orchestrator });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // Layer order: the request-ID setter is outermost so the ID exists
        // before anything else observes the request.
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections until the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_hosts = self.config.upstream.hosts.len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Catch-all handler: every request goes through the retry orchestrator.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        client = %client,
        method = %method,
        path = %path,
        "proxying request"
    );

    let response = state.orchestrator.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}
