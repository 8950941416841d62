//! Remote site credential
//!
//! The base URL + token pair authorizing calls to one WordPress site on
//! behalf of one user session.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CredentialError;

/// Credential for the remote plugin.
///
/// `base_url` and `token` are both required fields, so a half-credential
/// (URL without token or the reverse) cannot be represented.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCredential {
    /// WordPress site root, e.g. `https://example.com` or `https://example.com/blog`
    pub base_url: Url,

    /// Opaque bearer token issued by the plugin's linking flow
    pub token: String,

    /// Opaque refresh token, if the linking flow produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Whether mutating tools are allowed for this connection
    #[serde(default)]
    pub write_mode_enabled: bool,
}

impl RemoteCredential {
    /// Build a credential from a raw base URL and token.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, CredentialError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| CredentialError::InvalidBaseUrl(e.to_string()))?;
        let credential = Self {
            base_url,
            token: token.into(),
            refresh_token: None,
            write_mode_enabled: false,
        };
        credential.validate(true)?;
        Ok(credential)
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_write_mode(mut self, enabled: bool) -> Self {
        self.write_mode_enabled = enabled;
        self
    }

    /// Check that the credential can be used against a remote site.
    ///
    /// Plain `http://` is only accepted when `allow_insecure_http` is set.
    pub fn validate(&self, allow_insecure_http: bool) -> Result<(), CredentialError> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::MissingToken);
        }

        match self.base_url.scheme() {
            "https" => {}
            "http" if allow_insecure_http => {}
            "http" => return Err(CredentialError::InsecureScheme),
            other => return Err(CredentialError::UnsupportedScheme(other.to_string())),
        }

        if self.base_url.host_str().map_or(true, str::is_empty) {
            return Err(CredentialError::InvalidBaseUrl(
                "base URL has no host".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn site_root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Scheme + host + port, used in logs instead of the full URL
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    /// Same site and same token, whatever the write-mode flag says
    pub fn same_grant(&self, other: &RemoteCredential) -> bool {
        self.base_url == other.base_url && self.token == other.token
    }
}

impl std::fmt::Debug for RemoteCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredential")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("write_mode_enabled", &self.write_mode_enabled)
            .finish()
    }
}
