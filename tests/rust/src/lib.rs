//! Shared test utilities and fixtures for WPBridge integration tests.

pub use wpbridge_core::{
    AccessContext, BridgeError, CredentialStore, RemoteCredential, SessionId, ToolInvocation,
    ToolResult,
};

pub use mocks::{CountingStore, FailingStore};

pub use plugin::MockPlugin;

/// Test fixture utilities
pub mod fixtures {
    use super::*;

    /// Origin of the web application in gateway tests
    pub const APP_ORIGIN: &str = "https://app.example.com";

    /// Session signing secret shared by fixtures and gateways under test
    pub const SESSION_SECRET: &[u8] = b"integration_test_secret_32_bytes";

    /// Credential against an arbitrary base URL
    pub fn credential(base_url: &str, token: &str) -> RemoteCredential {
        RemoteCredential::new(base_url, token).expect("valid test credential")
    }

    /// The credential from the successful connect scenario
    pub fn example_credential() -> RemoteCredential {
        credential("https://example.com", "t1")
    }

    pub fn session(id: &str) -> SessionId {
        SessionId::new(id)
    }

    /// Signed session token valid for one hour
    pub fn session_token(sub: &str) -> String {
        wpbridge_gateway::issue_session_token(sub, 3600, SESSION_SECRET)
            .expect("session token")
    }
}

/// Initialize tracing output for a test run (RUST_LOG controls verbosity)
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
