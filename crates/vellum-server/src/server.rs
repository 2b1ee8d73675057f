use tokio::net::TcpListener;
use vellum_sdk::Vellum;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Vellum HTTP server.
pub struct VellumServer {
    config: ServerConfig,
    state: AppState,
}

impl VellumServer {
    /// Serve an existing instance.
    pub fn new(config: ServerConfig, vellum: Vellum) -> Self {
        Self {
            config,
            state: AppState::new(vellum),
        }
    }

    /// Open the instance under the configured data directory.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let vellum = Vellum::open(&config.vellum())?;
        Ok(Self::new(config, vellum))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "vellum server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
