//! HTTP API server for Audio Dojo

pub mod health;
pub mod ui;
pub mod voice;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::round_trip::RoundTrip;
use crate::Result;

/// Shared state for API handlers
#[derive(Clone, Debug)]
pub struct ApiState {
    /// Orchestrator; absent when no valid credential was configured
    pub round_trip: Option<Arc<RoundTrip>>,
    /// Why the orchestrator is absent, shown to users
    pub configuration_error: Option<String>,
    /// Default instruction text for the recording page
    pub system_prompt: String,
}

impl ApiState {
    /// Message reported when voice routes are called without a client handle
    #[must_use]
    pub fn not_configured_message(&self) -> String {
        self.configuration_error
            .clone()
            .unwrap_or_else(|| "voice client not configured".to_string())
    }
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    port: u16,
    round_trip: Option<Arc<RoundTrip>>,
    configuration_error: Option<String>,
    system_prompt: String,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            port,
            round_trip: None,
            configuration_error: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            static_dir: None,
        }
    }

    /// Set the round-trip orchestrator
    #[must_use]
    pub fn round_trip(mut self, round_trip: Arc<RoundTrip>) -> Self {
        self.round_trip = Some(round_trip);
        self
    }

    /// Record why no orchestrator could be built
    #[must_use]
    pub fn configuration_error(mut self, message: impl Into<String>) -> Self {
        self.configuration_error = Some(message.into());
        self
    }

    /// Set the default instruction text
    #[must_use]
    pub fn system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Set the static files directory served as fallback
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            round_trip: self.round_trip,
            configuration_error: self.configuration_error,
            system_prompt: self.system_prompt,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .nest("/api/voice", voice::router(self.state.clone()))
            .merge(ui::router())
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from a separately hosted frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        if self.state.round_trip.is_none() {
            tracing::error!(
                reason = %self.state.not_configured_message(),
                "voice round trip unavailable; the page will report the configuration error"
            );
        }

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
