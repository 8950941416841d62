//! Initialize handshake result
//!
//! Produced per initialize call and never persisted; the remote plugin may
//! be upgraded or downgraded between two calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity reported by the remote plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    /// Normalized plugin version (`serverInfo.version`, else legacy `pluginVersion`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Capability set announced by the plugin.
///
/// Only `toolsHash` is interpreted; every other capability is carried through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_hash: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Normalized outcome of a successful initialize exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResult {
    pub server_info: ServerInfo,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

impl HandshakeResult {
    /// Version string to feed the compatibility gate
    pub fn plugin_version(&self) -> Option<&str> {
        self.server_info.version.as_deref()
    }
}
