//! Classified errors
//!
//! Every failure that leaves the bridge is one of the [`BridgeError`] kinds.
//! Transport and storage specific errors are converted at the crate that
//! produces them.

use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure kinds surfaced to callers of the bridge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// No valid session, or no stored credential where one is required
    #[error("Not connected: {0}")]
    Unauthorized(String),

    /// Request origin is not on the allow-list
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Network-level failure talking to the remote plugin (DNS, TLS, timeout)
    #[error("Connection to remote plugin failed: {message}")]
    Connection { message: String, timed_out: bool },

    /// Remote answered with an unexpected or malformed payload
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Remote rejected the stored token; the local credential has been dropped
    #[error("Remote rejected the credential (HTTP {status}); reconnect required")]
    Auth { status: u16 },

    /// Handshake succeeded but the plugin is too old
    #[error("Plugin version {plugin_version} is not supported; minimum is {min_required}")]
    IncompatibleVersion {
        plugin_version: String,
        min_required: String,
    },

    /// Local credential store unavailable or unwritable
    #[error("Credential storage failed: {0}")]
    Storage(String),
}

impl BridgeError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Unauthorized(_) => "unauthorized",
            BridgeError::Forbidden(_) => "forbidden",
            BridgeError::Connection { .. } => "connection_error",
            BridgeError::Protocol(_) => "protocol_error",
            BridgeError::Auth { .. } => "auth_error",
            BridgeError::IncompatibleVersion { .. } => "incompatible_version",
            BridgeError::Storage(_) => "storage_error",
        }
    }

    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Connection { .. })
    }

    /// Whether the user has to link the site again
    pub fn reconnect_required(&self) -> bool {
        matches!(self, BridgeError::Auth { .. })
    }
}

/// Credential store failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("session could not be identified")]
    UnidentifiedSession,

    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to seal credential: {0}")]
    Encryption(String),
}

impl From<StorageError> for BridgeError {
    fn from(e: StorageError) -> Self {
        BridgeError::Storage(e.to_string())
    }
}

/// Validation failures for a candidate credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("token must not be empty")]
    MissingToken,

    #[error("plain http:// base URLs are not allowed")]
    InsecureScheme,

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}
