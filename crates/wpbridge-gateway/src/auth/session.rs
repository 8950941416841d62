//! Session resolution
//!
//! The bridge trusts whatever session identifier the resolver returns. The
//! bundled resolver validates an HMAC-SHA256 signed token issued by the web
//! application, carried either in the session cookie or as a bearer token.
//!
//! Token format: `base64url(payload).base64url(signature)` where the payload
//! is `{"sub": ..., "iat": ..., "exp": ...}`.

use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use wpbridge_core::SessionId;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Maps an inbound request to a stable session identifier.
pub trait SessionResolver: Send + Sync {
    /// `None` means "no session".
    fn resolve(&self, headers: &HeaderMap) -> Option<SessionId>;
}

/// Resolver for signed session tokens.
pub struct SignedSessionCookieResolver {
    cookie_name: String,
    secret: Zeroizing<Vec<u8>>,
}

impl SignedSessionCookieResolver {
    pub fn new(cookie_name: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secret: Zeroizing::new(secret.to_vec()),
        }
    }

    fn token_from_headers<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if let Some(token) = read_cookie(headers, &self.cookie_name) {
            return Some(token);
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl SessionResolver for SignedSessionCookieResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<SessionId> {
        let token = self.token_from_headers(headers)?;
        let claims = validate_session_token(token, &self.secret)?;
        let session = SessionId::new(claims.sub);

        session.is_identified().then_some(session)
    }
}

/// Find a cookie value by name across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Issue a signed session token for `sub` valid for `ttl_secs` seconds.
pub fn issue_session_token(sub: &str, ttl_secs: i64, secret: &[u8]) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: sub.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    let payload = serde_json::to_vec(&claims)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| anyhow!("invalid session secret: {}", e))?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Validate a token and extract its claims.
pub fn validate_session_token(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    let (payload_b64, signature_b64) = token.split_once('.')?;
    if signature_b64.contains('.') {
        debug!("[Auth] Invalid session token format");
        return None;
    }

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload_b64.as_bytes());
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    if mac.verify_slice(&signature).is_err() {
        debug!("[Auth] Invalid session token signature");
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let claims: SessionClaims = serde_json::from_slice(&payload).ok()?;

    let now = chrono::Utc::now().timestamp();
    if now >= claims.exp {
        debug!("[Auth] Session token expired at {}, now is {}", claims.exp, now);
        return None;
    }

    Some(claims)
}
