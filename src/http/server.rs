//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap an application Router with the interception middleware
//! - Wire up cross-cutting middleware (tracing, timeout)
//! - Bind server to listener
//! - Shut down gracefully on Ctrl+C

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::middleware::{intercept_middleware, InterceptState};
use crate::interceptor::{Interceptor, SnapshotBackend};

/// HTTP server placing the crawler gate in front of an application.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `app` behind `interceptor`.
    pub fn new<B>(config: ServerConfig, interceptor: Interceptor<B>, app: Router) -> Self
    where
        B: SnapshotBackend + 'static,
    {
        let state = InterceptState::new(interceptor);
        let router = Self::build_router(&config, app, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<B>(config: &ServerConfig, app: Router, state: InterceptState<B>) -> Router
    where
        B: SnapshotBackend + 'static,
    {
        app.layer(middleware::from_fn_with_state(state, intercept_middleware::<B>))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Router with all layers applied.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_secs = self.config.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Placeholder application: reports that the request was served normally.
pub fn passthrough_app() -> Router {
    Router::new().fallback(passthrough_handler)
}

async fn passthrough_handler(req: Request<Body>) -> impl IntoResponse {
    (
        StatusCode::OK,
        format!("served normally: {} {}\n", req.method(), req.uri()),
    )
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
