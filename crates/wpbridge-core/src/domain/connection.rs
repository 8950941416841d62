//! Connection lifecycle state

use serde::Serialize;

use super::HandshakeResult;
use crate::version::CompatibilityVerdict;

/// Per-session connection state.
///
/// `Disconnected → Connecting → Connected → Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Result of a connect or meta check: a fresh handshake and its verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub state: ConnectionState,
    #[serde(flatten)]
    pub handshake: HandshakeResult,
    pub compatibility: CompatibilityVerdict,
}
