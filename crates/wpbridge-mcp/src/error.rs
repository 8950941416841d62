//! Protocol client errors and their classification.

use thiserror::Error;
use wpbridge_core::BridgeError;

/// Failures of a single exchange with the remote plugin.
#[derive(Debug, Error)]
pub enum ClientError {
    /// DNS, TLS, refused connection, or a 5xx from the site
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// 401/403 from the plugin: the token is stale or revoked
    #[error("Remote rejected credential (HTTP {status})")]
    Auth { status: u16 },

    /// Remote answered with something that is not the expected JSON-RPC shape
    #[error("Malformed response: {0}")]
    Protocol(String),

    /// Well-formed JSON-RPC error object
    #[error("Remote error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// A tool was invoked before `initialize()` succeeded
    #[error("Not initialized: call initialize first")]
    NotInitialized,
}

impl From<ClientError> for BridgeError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Connection(message) => BridgeError::connection(message),
            ClientError::Timeout(_) => BridgeError::timeout(e.to_string()),
            ClientError::Auth { status } => BridgeError::Auth { status },
            ClientError::Protocol(message) => BridgeError::Protocol(message),
            ClientError::Rpc { .. } | ClientError::NotInitialized => {
                BridgeError::Protocol(e.to_string())
            }
        }
    }
}
