//! JSON-RPC 2.0 framing
//!
//! The plugin answers either with a plain `application/json` body or, when it
//! speaks Streamable HTTP, with a `text/event-stream` body carrying the
//! response as an SSE `data:` event.

use std::convert::Infallible;
use std::pin::pin;

use eventsource_stream::Eventsource;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;

pub const JSONRPC_VERSION: &str = "2.0";

/// Closes an event the server left unterminated
const EVENT_TERMINATOR: &[u8] = b"\n\n";

/// Outgoing request
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Incoming response
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Extract the result for request `expected_id`.
    pub fn into_result(self, expected_id: u64) -> Result<Value, ClientError> {
        match &self.id {
            Some(Value::Number(n)) if n.as_u64() == Some(expected_id) => {}
            Some(Value::String(s)) if s == &expected_id.to_string() => {}
            // Some plugins answer errors with a null id
            None | Some(Value::Null) if self.error.is_some() => {}
            other => {
                return Err(ClientError::Protocol(format!(
                    "response id {:?} does not match request id {}",
                    other, expected_id
                )))
            }
        }

        if let Some(error) = self.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        self.result
            .ok_or_else(|| ClientError::Protocol("response has neither result nor error".to_string()))
    }
}

/// Parse a response body according to its content type.
pub async fn parse_response_body(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<JsonRpcResponse, ClientError> {
    let is_sse = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/event-stream"))
        .unwrap_or(false);

    if is_sse {
        return parse_event_stream(body).await;
    }

    serde_json::from_slice(body).map_err(|e| {
        ClientError::Protocol(format!("response is not a JSON-RPC object: {}", e))
    })
}

/// Pick the first SSE event whose data is a JSON-RPC response.
///
/// Notifications and keep-alives are skipped. A final event missing its
/// blank-line terminator still counts.
async fn parse_event_stream(body: &[u8]) -> Result<JsonRpcResponse, ClientError> {
    let chunks = [Ok::<_, Infallible>(body), Ok(EVENT_TERMINATOR)];
    let mut events = pin!(stream::iter(chunks).eventsource());

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| ClientError::Protocol(format!("malformed event stream: {}", e)))?;
        if event.data.is_empty() {
            continue;
        }
        match serde_json::from_str::<JsonRpcResponse>(&event.data) {
            Ok(response) if response.result.is_some() || response.error.is_some() => {
                return Ok(response)
            }
            Ok(_) => debug!(event = %event.event, "[JsonRpc] Skipping non-response event"),
            Err(e) => debug!("[JsonRpc] Skipping event with non JSON-RPC data: {}", e),
        }
    }

    Err(ClientError::Protocol(
        "event stream contained no JSON-RPC response".to_string(),
    ))
}
