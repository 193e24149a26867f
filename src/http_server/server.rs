//! # HTTP Server
//!
//! Combines the participant routes with static file serving.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use super::config::HttpServerConfig;
use super::routes::participant_routes;
use crate::observability::{log_event, Event};
use crate::participants::ParticipantLifecycle;

/// Process-wide state shared by every handler. Built once, read-only.
pub struct AppState {
    pub lifecycle: ParticipantLifecycle,
}

impl AppState {
    pub fn new(lifecycle: ParticipantLifecycle) -> Self {
        Self { lifecycle }
    }
}

/// HTTP server for the skatepark site
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over `state`
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        Router::new()
            .merge(participant_routes(state.clone()))
            // Uploaded photos
            .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
            // Stylesheets, images and anything else under the public dir
            .fallback_service(ServeDir::new(&config.public_dir))
            .layer(DefaultBodyLimit::max(config.max_upload_bytes))
            .with_state(state)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        log_event(Event::Serving, &[("addr", addr.to_string().as_str())]);

        axum::serve(listener, self.router).await
    }
}
