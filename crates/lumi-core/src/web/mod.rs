//! Local HTTP bridge between the UI and the controller.
//!
//! The UI process talks to the backend over a localhost HTTP API and
//! receives backend events as Server-Sent Events. Subscribing to the event
//! stream is the connection notification of the deferred event channel, so
//! events emitted before the UI loaded are delivered once it does.
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | /api/v1/lumi/events | Channel events (SSE) |
//! | GET | /api/v1/lumi/content/{id} | Load content for the editor |
//! | DELETE | /api/v1/lumi/content/{id} | Delete content |
//! | POST | /api/v1/lumi/content | Create or update content |
//! | POST | /api/v1/lumi/export | Export a package |
//! | POST | /api/v1/lumi/import | Import a package |
//! | POST | /api/v1/lumi/pick/h5p | Pick packages to import |
//! | POST | /api/v1/lumi/pick/css | Pick a stylesheet |

pub mod error;
pub mod handlers;
pub mod sse;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::WebConfig;
use crate::error::{Error, Result};

pub use error::{ApiError, ApiResult};
pub use state::{AppState, SharedState};

/// Largest accepted request body (content parameters can embed media).
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind to localhost only
    pub localhost_only: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from(&WebConfig::default())
    }
}

impl From<&WebConfig> for WebServerConfig {
    fn from(config: &WebConfig) -> Self {
        Self {
            port: config.port,
            localhost_only: config.localhost_only,
        }
    }
}

impl WebServerConfig {
    /// Get the bind address for the server.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        if self.localhost_only {
            SocketAddr::from(([127, 0, 0, 1], self.port))
        } else {
            SocketAddr::from(([0, 0, 0, 0], self.port))
        }
    }
}

/// Build the API router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/lumi/events", get(sse::events_sse))
        .route(
            "/api/v1/lumi/content/{id}",
            get(handlers::get_content).delete(handlers::delete_content),
        )
        .route("/api/v1/lumi/content", post(handlers::update_content))
        .route("/api/v1/lumi/export", post(handlers::export_content))
        .route("/api/v1/lumi/import", post(handlers::import_content))
        .route("/api/v1/lumi/pick/h5p", post(handlers::pick_h5p_files))
        .route("/api/v1/lumi/pick/css", post(handlers::pick_css_file))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The web server instance.
#[derive(Debug)]
pub struct WebServer {
    config: WebServerConfig,
    state: SharedState,
}

impl WebServer {
    /// Create a new web server with the given configuration.
    #[must_use]
    pub fn new(config: WebServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Get the server configuration.
    #[must_use]
    pub const fn config(&self) -> &WebServerConfig {
        &self.config
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn serve<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Lumi bridge listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::Internal(format!("web server failed: {e}")))?;

        tracing::info!("Lumi bridge stopped");
        Ok(())
    }
}
