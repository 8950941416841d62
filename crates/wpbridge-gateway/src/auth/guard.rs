//! Origin/access guard
//!
//! Every control request passes through [`AccessGuard`] before any credential
//! is read or written. The origin check runs first, then the session check.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use tracing::{debug, warn};
use url::Url;
use wpbridge_core::{AccessContext, BridgeError};

use super::SessionResolver;

/// Normalize an origin or URL to `scheme://host[:port]`.
///
/// Returns `None` for opaque origins (`null`, `data:`, ...).
pub fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Allow-list and session check for inbound control requests.
pub struct AccessGuard {
    allowed_origins: HashSet<String>,
    resolver: Arc<dyn SessionResolver>,
}

impl AccessGuard {
    pub fn new<I, S>(allowed_origins: I, resolver: Arc<dyn SessionResolver>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_origins = allowed_origins
            .into_iter()
            .filter_map(|o| normalize_origin(o.as_ref()))
            .collect();
        Self {
            allowed_origins,
            resolver,
        }
    }

    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        normalize_origin(origin).map_or(false, |o| self.allowed_origins.contains(&o))
    }

    /// Authorize a control request (connect, disconnect, tool invocation).
    ///
    /// The declared origin is mandatory and must be allow-listed. When
    /// `require_session` is set, a resolvable session is mandatory too.
    pub fn authorize(&self, headers: &HeaderMap, require_session: bool) -> Result<AccessContext, BridgeError> {
        let origin = declared_origin(headers).ok_or_else(|| {
            warn!("[Guard] Rejected control request without origin");
            BridgeError::Forbidden("request origin is missing".to_string())
        })?;
        self.check_origin(&origin)?;

        self.with_session(headers, origin, require_session)
    }

    /// Authorize a read-only request (meta).
    ///
    /// Same-origin GETs usually carry no `Origin` header, so it is optional
    /// here; a present one must still be allow-listed. A session is required.
    pub fn authorize_read(&self, headers: &HeaderMap) -> Result<AccessContext, BridgeError> {
        let origin = match declared_origin(headers) {
            Some(origin) => {
                self.check_origin(&origin)?;
                origin
            }
            None => String::new(),
        };

        self.with_session(headers, origin, true)
    }

    fn check_origin(&self, origin: &str) -> Result<(), BridgeError> {
        if self.is_allowed_origin(origin) {
            Ok(())
        } else {
            warn!(origin = %origin, "[Guard] Rejected origin not on allow-list");
            Err(BridgeError::Forbidden(format!(
                "origin {} is not allowed",
                origin
            )))
        }
    }

    fn with_session(
        &self,
        headers: &HeaderMap,
        origin: String,
        require_session: bool,
    ) -> Result<AccessContext, BridgeError> {
        match self.resolver.resolve(headers) {
            Some(session) => {
                debug!(session = %session.short(), "[Guard] Access granted");
                Ok(AccessContext::new(session.as_str(), origin))
            }
            None if require_session => {
                debug!("[Guard] No valid session");
                Err(BridgeError::Unauthorized("no valid session".to_string()))
            }
            None => Ok(AccessContext::new("", origin)),
        }
    }
}

/// `Origin` header, falling back to the origin of `Referer`.
fn declared_origin(headers: &HeaderMap) -> Option<String> {
    let read = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match read(header::ORIGIN) {
        // "null" is a declared origin and fails the allow-list
        Some(origin) => Some(origin.to_string()),
        None => read(header::REFERER).and_then(normalize_origin),
    }
}
