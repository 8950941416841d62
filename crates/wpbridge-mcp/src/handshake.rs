//! Initialize result normalization
//!
//! Plugins report their version in one of two places:
//!
//! 1. `serverInfo.version` (current plugins)
//! 2. top-level `pluginVersion` (legacy plugins)
//!
//! The first one present wins; when neither is present the version is absent
//! and the compatibility gate treats it as `0.0.0`.

use serde_json::{Map, Value};
use wpbridge_core::{Capabilities, HandshakeResult, ServerInfo};

use crate::error::ClientError;

const UNKNOWN_SERVER_NAME: &str = "unknown";

/// Turn a raw `initialize` result into a [`HandshakeResult`].
pub fn normalize_initialize_result(result: &Value) -> Result<HandshakeResult, ClientError> {
    let obj = result
        .as_object()
        .ok_or_else(|| ClientError::Protocol("initialize result is not an object".to_string()))?;

    let server_info = match obj.get("serverInfo") {
        None | Some(Value::Null) => None,
        Some(Value::Object(info)) => Some(info),
        Some(_) => {
            return Err(ClientError::Protocol(
                "serverInfo is not an object".to_string(),
            ))
        }
    };

    let name = match server_info.and_then(|info| info.get("name")) {
        None | Some(Value::Null) => UNKNOWN_SERVER_NAME.to_string(),
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(ClientError::Protocol("serverInfo.name is not a string".to_string())),
    };

    let version = match version_field(server_info, "version")? {
        Some(version) => Some(version),
        None => version_field(Some(obj), "pluginVersion")?,
    };

    let capabilities = match obj.get("capabilities") {
        None | Some(Value::Null) => Capabilities::default(),
        Some(caps @ Value::Object(_)) => serde_json::from_value(caps.clone())
            .map_err(|e| ClientError::Protocol(format!("invalid capabilities: {}", e)))?,
        Some(_) => {
            return Err(ClientError::Protocol(
                "capabilities is not an object".to_string(),
            ))
        }
    };

    let protocol_version = obj
        .get("protocolVersion")
        .and_then(Value::as_str)
        .map(String::from);

    Ok(HandshakeResult {
        server_info: ServerInfo { name, version },
        capabilities,
        protocol_version,
    })
}

/// Read a version field that may be a string or a bare number.
fn version_field(source: Option<&Map<String, Value>>, key: &str) -> Result<Option<String>, ClientError> {
    match source.and_then(|map| map.get(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ClientError::Protocol(format!("{} is not a version string", key))),
    }
}
