//! Gateway Server
//!
//! HTTP surface over the connection lifecycle. Control routes pass the
//! origin/access guard before any handler runs.
//!
//! | Route | Access |
//! |---|---|
//! | `GET /health` | public |
//! | `POST /api/mcp/connect` | origin + session |
//! | `GET /api/mcp/meta` | session (origin checked if declared) |
//! | `POST /api/mcp/disconnect` | origin + session |
//! | `POST /api/mcp/tools/call` | origin + session |
//! | `GET /api/mcp/tools` | origin + session |
//! | `POST /api/mcp/write-mode` | origin + session |

mod cookies;
mod error;
mod handlers;
pub mod logging_middleware;
mod state;

pub use cookies::{clear_feature_cookies, clearing_cookie, site_cookie};
pub use error::{bridge_status, ApiError};
pub use handlers::{ConnectRequest, StatusResponse};
pub use state::{AppState, ControlAccess, ReadAccess};

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wpbridge_core::CredentialStore;
use wpbridge_mcp::{ClientFactory, HttpClientFactory};

use crate::auth::{AccessGuard, SessionResolver};
use crate::config::GatewayConfig;
use crate::lifecycle::ConnectionManager;

/// Largest request body the gateway reads (1 MiB)
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Build the Axum router over prepared state.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/mcp/connect", post(handlers::connect))
        .route("/api/mcp/meta", get(handlers::meta))
        .route("/api/mcp/disconnect", post(handlers::disconnect))
        .route("/api/mcp/tools/call", post(handlers::call_tool))
        .route("/api/mcp/tools", get(handlers::list_tools))
        .route("/api/mcp/write-mode", post(handlers::set_write_mode))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            logging_middleware::http_logging_middleware,
        ))
        .layer(cors)
}

/// WPBridge Gateway Server
///
/// All external collaborators (credential store, session resolver, client
/// factory) are injected through the constructor.
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a gateway using HTTP protocol clients built from `config`.
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn CredentialStore>,
        resolver: Arc<dyn SessionResolver>,
    ) -> Self {
        let clients = Arc::new(HttpClientFactory::new(config.client_config()));
        Self::with_client_factory(config, store, resolver, clients)
    }

    pub fn with_client_factory(
        config: GatewayConfig,
        store: Arc<dyn CredentialStore>,
        resolver: Arc<dyn SessionResolver>,
        clients: Arc<dyn ClientFactory>,
    ) -> Self {
        let guard = AccessGuard::new(&config.allowed_origins, resolver);
        let state = AppState {
            manager: Arc::new(ConnectionManager::new(store, clients)),
            guard: Arc::new(guard),
            allow_insecure_http: config.allow_insecure_http,
        };

        Self { config, state }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config.allowed_origins)
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.config.addr()?;

        info!("[Gateway] Starting on {}", addr);
        info!("[Gateway] Allowed origins: {}", self.config.allowed_origins.join(", "));
        info!(
            "[Gateway] Remote timeout: {}s, MCP path: {}",
            self.config.remote_timeout.as_secs(),
            self.config.mcp_path
        );
        if self.config.allow_insecure_http {
            warn!("[Gateway] Plain http:// site URLs are accepted (development mode)");
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("Gateway server error")?;

        info!("[Gateway] Stopped");
        Ok(())
    }
}
