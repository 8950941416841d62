//! # WPBridge MCP Client
//!
//! JSON-RPC client for the MCP endpoint exposed by the WordPress plugin.
//!
//! This crate provides:
//! - The `initialize` handshake and its version normalization
//! - `tools/call` and `tools/list` over Streamable HTTP (JSON or SSE bodies)
//! - Classification of every failure into connection / auth / protocol kinds
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐  create(credential)  ┌──────────────────────┐
//! │  HttpClientFactory   │ ───────────────────▶ │    McpHttpClient     │
//! │  (ClientConfig)      │                      │  Created/Initialized │
//! └──────────────────────┘                      └──────────┬───────────┘
//!                                                          │ POST JSON-RPC
//!                                                          ▼
//!                                          {site_root}/wp-json/wpbridge/v1/mcp
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wpbridge_mcp::{ClientFactory, HttpClientFactory, ProtocolClient};
//!
//! let mut client = HttpClientFactory::default().create(&credential)?;
//! let handshake = client.initialize().await?;
//! let result = client.call_tool(&ToolInvocation::new("wp_get_posts")).await?;
//! ```

pub mod client;
pub mod error;
pub mod handshake;
pub mod jsonrpc;

pub use client::{
    ClientConfig, ClientFactory, HttpClientFactory, McpHttpClient, ProtocolClient,
    DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::ClientError;
pub use handshake::normalize_initialize_result;
