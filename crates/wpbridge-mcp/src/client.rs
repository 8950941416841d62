//! MCP client for one remote WordPress site.
//!
//! A client is bound to exactly one credential and lives for one request
//! cycle. It follows a small state machine:
//!
//! ```text
//! Created ──initialize()──▶ Initialized ──call_tool()/list_tools()──▶ Initialized
//! ```
//!
//! Tool calls on a `Created` client fail with [`ClientError::NotInitialized`]
//! without touching the network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, warn};
use wpbridge_core::branding::{
    CLIENT_NAME, DEFAULT_MCP_PATH, MCP_SESSION_HEADER, PROTOCOL_VERSION, WRITE_MODE_HEADER,
};
use wpbridge_core::{HandshakeResult, RemoteCredential, ToolInvocation, ToolResult};

use crate::error::ClientError;
use crate::handshake::normalize_initialize_result;
use crate::jsonrpc::{parse_response_body, JsonRpcRequest};

/// Default bound for every call to the remote plugin
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest reply body read from the remote plugin
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Settings shared by all clients built by one factory.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path of the MCP endpoint below the site root
    pub mcp_path: String,
    /// Upper bound for a single request, connect included
    pub request_timeout: Duration,
    /// Replies larger than this fail with [`ClientError::Protocol`]
    pub max_response_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mcp_path: DEFAULT_MCP_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// Handshake and tool invocation against a remote plugin.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Perform the initialize handshake.
    async fn initialize(&mut self) -> Result<HandshakeResult, ClientError>;

    /// Invoke a named tool. Requires a prior successful `initialize()`.
    async fn call_tool(&self, invocation: &ToolInvocation) -> Result<ToolResult, ClientError>;

    /// List the tools exposed by the plugin. Requires a prior `initialize()`.
    async fn list_tools(&self) -> Result<ToolResult, ClientError>;

    /// Handshake of this client lifetime, if initialized
    fn handshake(&self) -> Option<&HandshakeResult>;
}

/// Builds a fresh [`ProtocolClient`] per credential.
pub trait ClientFactory: Send + Sync {
    fn create(&self, credential: &RemoteCredential) -> Result<Box<dyn ProtocolClient>, ClientError>;
}

enum ClientState {
    Created,
    Initialized {
        handshake: HandshakeResult,
        session_id: Option<String>,
    },
}

/// Reply of one JSON-RPC exchange
struct RpcReply {
    result: Value,
    session_id: Option<String>,
}

/// Streamable-HTTP/JSON-RPC client for the WordPress plugin endpoint.
pub struct McpHttpClient {
    http: reqwest::Client,
    endpoint: String,
    site: String,
    timeout: Duration,
    max_response_bytes: usize,
    next_id: AtomicU64,
    state: ClientState,
}

impl McpHttpClient {
    pub fn new(credential: &RemoteCredential, config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = format!(
            "{}/{}",
            credential.site_root(),
            config.mcp_path.trim_start_matches('/')
        );

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.token))
            .map_err(|_| ClientError::Protocol("token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/event-stream"));
        headers.insert(
            WRITE_MODE_HEADER,
            HeaderValue::from_static(if credential.write_mode_enabled {
                "enabled"
            } else {
                "disabled"
            }),
        );

        // Fresh client per credential: no connection reuse across sessions
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .user_agent(format!("{}/{}", CLIENT_NAME, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            site: credential.origin(),
            timeout: config.request_timeout,
            max_response_bytes: config.max_response_bytes,
            next_id: AtomicU64::new(1),
            state: ClientState::Created,
        })
    }

    /// Full URL the client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, ClientState::Initialized { .. })
    }

    fn classify_transport(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Connection(e.without_url().to_string())
        }
    }

    /// Read the reply body, refusing to buffer more than the configured cap.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let limit = self.max_response_bytes;
        let too_large = || ClientError::Protocol(format!("response body exceeds {} bytes", limit));

        if response.content_length().is_some_and(|len| len > limit as u64) {
            warn!(site = %self.site, "[McpClient] Declared response too large");
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.classify_transport(e))?
        {
            if body.len() + chunk.len() > limit {
                warn!(site = %self.site, "[McpClient] Response grew past the size limit");
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn request(
        &self,
        method: &str,
        params: Value,
        session_id: Option<&str>,
    ) -> Result<RpcReply, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest::new(id, method, params);

        debug!(site = %self.site, method, id, "[McpClient] Sending request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(session_id) = session_id {
            request = request.header(MCP_SESSION_HEADER, session_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            warn!(site = %self.site, method, status = status.as_u16(), "[McpClient] Credential rejected");
            return Err(ClientError::Auth {
                status: status.as_u16(),
            });
        }
        if status.is_server_error() {
            return Err(ClientError::Connection(format!(
                "remote returned HTTP {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(ClientError::Protocol(format!(
                "unexpected HTTP status {} for {}",
                status.as_u16(),
                method
            )));
        }

        let session_id = response
            .headers()
            .get(MCP_SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = self.read_body(response).await?;

        let result = parse_response_body(content_type.as_deref(), &body)
            .await?
            .into_result(id)?;

        debug!(site = %self.site, method, id, "[McpClient] Response received");

        Ok(RpcReply { result, session_id })
    }

    /// Session header of an initialized client
    fn initialized_session(&self) -> Result<Option<&str>, ClientError> {
        match &self.state {
            ClientState::Created => Err(ClientError::NotInitialized),
            ClientState::Initialized { session_id, .. } => Ok(session_id.as_deref()),
        }
    }
}

#[async_trait]
impl ProtocolClient for McpHttpClient {
    async fn initialize(&mut self) -> Result<HandshakeResult, ClientError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let reply = self.request("initialize", params, None).await?;
        let handshake = normalize_initialize_result(&reply.result)?;

        debug!(
            site = %self.site,
            server = %handshake.server_info.name,
            version = handshake.plugin_version().unwrap_or("-"),
            "[McpClient] Initialized"
        );

        self.state = ClientState::Initialized {
            handshake: handshake.clone(),
            session_id: reply.session_id,
        };
        Ok(handshake)
    }

    async fn call_tool(&self, invocation: &ToolInvocation) -> Result<ToolResult, ClientError> {
        let session_id = self.initialized_session()?;

        let params = json!({
            "name": invocation.name,
            "arguments": invocation.args,
        });
        let reply = self.request("tools/call", params, session_id).await?;

        Ok(ToolResult::new(reply.result))
    }

    async fn list_tools(&self) -> Result<ToolResult, ClientError> {
        let session_id = self.initialized_session()?;

        let reply = self.request("tools/list", json!({}), session_id).await?;
        if !reply.result.get("tools").map_or(false, Value::is_array) {
            return Err(ClientError::Protocol(
                "tools/list result has no tools array".to_string(),
            ));
        }

        Ok(ToolResult::new(reply.result))
    }

    fn handshake(&self) -> Option<&HandshakeResult> {
        match &self.state {
            ClientState::Created => None,
            ClientState::Initialized { handshake, .. } => Some(handshake),
        }
    }
}

/// Factory producing [`McpHttpClient`]s.
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory {
    config: ClientConfig,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(&self, credential: &RemoteCredential) -> Result<Box<dyn ProtocolClient>, ClientError> {
        Ok(Box::new(McpHttpClient::new(credential, &self.config)?))
    }
}
