//! WPBridge Gateway
//!
//! Connection & protocol bridge between a web application session and a
//! remote WordPress site's MCP plugin:
//! - Origin/access guard for every control request
//! - Connection lifecycle (connect, meta, disconnect, tool calls, write mode)
//! - Signed session resolution
//! - Axum HTTP surface with classified JSON errors and request tracing

pub mod auth;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod server;

pub use auth::{
    issue_session_token, AccessGuard, SessionClaims, SessionResolver, SignedSessionCookieResolver,
};
pub use config::GatewayConfig;
pub use lifecycle::ConnectionManager;
pub use server::{build_router, ApiError, AppState, GatewayServer, MAX_REQUEST_BODY_BYTES};
