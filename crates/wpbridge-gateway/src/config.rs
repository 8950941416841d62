//! Gateway configuration
//!
//! Loaded from `WPBRIDGE_*` environment variables (a `.env` file is honored).
//! Absent optional variables take their defaults; present but invalid values
//! are startup errors.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use wpbridge_core::branding::{DEFAULT_GATEWAY_PORT, DEFAULT_MCP_PATH, DEFAULT_SESSION_COOKIE};
use wpbridge_mcp::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
use zeroize::Zeroizing;

use crate::auth::normalize_origin;

/// Minimum length of the session signing secret
pub const MIN_SESSION_SECRET_LEN: usize = 32;

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Gateway server configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to issue control requests, as `scheme://host[:port]`
    pub allowed_origins: Vec<String>,
    /// Name of the signed session cookie
    pub session_cookie_name: String,
    /// HMAC secret for session tokens
    pub session_secret: Option<Zeroizing<Vec<u8>>>,
    /// Hex-encoded AES-256 key for sealed SQLite records
    pub master_key: Option<Zeroizing<String>>,
    /// SQLite path; no path means the in-memory store
    pub database_path: Option<PathBuf>,
    /// Upper bound for every call to a remote plugin
    pub remote_timeout: Duration,
    /// MCP endpoint path appended to the site root
    pub mcp_path: String,
    /// Accept `http://` base URLs (local development only)
    pub allow_insecure_http: bool,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_GATEWAY_PORT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            session_secret: None,
            master_key: None,
            database_path: None,
            remote_timeout: DEFAULT_REQUEST_TIMEOUT,
            mcp_path: DEFAULT_MCP_PATH.to_string(),
            allow_insecure_http: false,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_secret", &self.session_secret.as_ref().map(|_| "[REDACTED]"))
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("database_path", &self.database_path)
            .field("remote_timeout", &self.remote_timeout)
            .field("mcp_path", &self.mcp_path)
            .field("allow_insecure_http", &self.allow_insecure_http)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl GatewayConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("WPBRIDGE_HOST") {
            config.host = host.trim().to_string();
        }

        if let Some(port) = get("WPBRIDGE_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("WPBRIDGE_PORT is not a valid port: {}", port))?;
        }

        if let Some(origins) = get("WPBRIDGE_ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| {
                    normalize_origin(o)
                        .ok_or_else(|| anyhow!("WPBRIDGE_ALLOWED_ORIGINS entry is not an origin: {}", o))
                })
                .collect::<Result<_>>()?;
        }

        if let Some(name) = get("WPBRIDGE_SESSION_COOKIE") {
            config.session_cookie_name = name.trim().to_string();
        }

        if let Some(secret) = lookup("WPBRIDGE_SESSION_SECRET").filter(|s| !s.is_empty()) {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                bail!(
                    "WPBRIDGE_SESSION_SECRET must be at least {} bytes",
                    MIN_SESSION_SECRET_LEN
                );
            }
            config.session_secret = Some(Zeroizing::new(secret.into_bytes()));
        }

        if let Some(key) = get("WPBRIDGE_MASTER_KEY") {
            config.master_key = Some(Zeroizing::new(key.trim().to_string()));
        }

        if let Some(path) = get("WPBRIDGE_DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(path.trim()));
        }

        if let Some(secs) = get("WPBRIDGE_REMOTE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("WPBRIDGE_REMOTE_TIMEOUT_SECS is not a number: {}", secs))?;
            if secs == 0 {
                bail!("WPBRIDGE_REMOTE_TIMEOUT_SECS must be greater than zero");
            }
            config.remote_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = get("WPBRIDGE_MCP_PATH") {
            let path = path.trim();
            config.mcp_path = if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            };
        }

        if let Some(flag) = get("WPBRIDGE_ALLOW_INSECURE_HTTP") {
            config.allow_insecure_http = parse_bool(&flag)
                .ok_or_else(|| anyhow!("WPBRIDGE_ALLOW_INSECURE_HTTP is not a boolean: {}", flag))?;
        }

        if let Some(dir) = get("WPBRIDGE_LOG_DIR") {
            config.log_dir = PathBuf::from(dir.trim());
        }

        Ok(config)
    }

    /// Get the socket address
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Settings for protocol clients built by the gateway
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            mcp_path: self.mcp_path.clone(),
            request_timeout: self.remote_timeout,
            ..ClientConfig::default()
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
