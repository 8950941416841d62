//! Remote tool invocation types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named remote operation with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Raw result payload returned by the remote plugin.
///
/// Serializes as the payload itself so it passes through to the caller
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResult {
    pub payload: Value,
}

impl ToolResult {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// MCP tool results flag tool-level failures with `isError`
    pub fn is_error(&self) -> bool {
        self.payload
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
