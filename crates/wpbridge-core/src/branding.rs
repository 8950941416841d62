//! Centralized product constants
//!
//! All naming shared between the gateway, the protocol client and the
//! surrounding web layer lives here.

/// Human readable product name
pub const DISPLAY_NAME: &str = "WPBridge";

/// Client name announced to the remote plugin during initialize
pub const CLIENT_NAME: &str = "wpbridge";

/// Minimum remote plugin version this bridge can talk to
pub const MIN_PLUGIN_VERSION: &str = "0.1.0";

/// MCP protocol revision sent in the initialize request
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Default path of the MCP endpoint exposed by the WordPress plugin
pub const DEFAULT_MCP_PATH: &str = "/wp-json/wpbridge/v1/mcp";

/// Prefix of rolling log files (`wpbridge.2026-01-22.log`)
pub const LOG_PREFIX: &str = "wpbridge";

/// Default gateway port
pub const DEFAULT_GATEWAY_PORT: u16 = 45900;

/// Default name of the signed session cookie issued by the web app
pub const DEFAULT_SESSION_COOKIE: &str = "wpbridge_session";

/// Non-secret cookie carrying the connected site URL for display
pub const SITE_COOKIE: &str = "wpbridge_site";

/// Every browser cookie owned by this feature.
///
/// Disconnect clears all of them with `Max-Age=0; Path=/`, including the
/// legacy token cookies written by older web layers.
pub const FEATURE_COOKIES: &[&str] = &[
    SITE_COOKIE,
    "wpbridge_token",
    "wpbridge_refresh",
    "wpbridge_write_mode",
];

/// Header telling the plugin whether mutating tools may run
pub const WRITE_MODE_HEADER: &str = "X-WPBridge-Write-Mode";

/// Streamable HTTP session header echoed after initialize
pub const MCP_SESSION_HEADER: &str = "Mcp-Session-Id";
