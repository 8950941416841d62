//! Per-request access context produced by the origin/access guard

use super::SessionId;

/// Caller identity and declared origin of one inbound control request.
///
/// Derived per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    pub session_user_id: String,
    pub origin_header: String,
}

impl AccessContext {
    pub fn new(session_user_id: impl Into<String>, origin_header: impl Into<String>) -> Self {
        Self {
            session_user_id: session_user_id.into(),
            origin_header: origin_header.into(),
        }
    }

    /// Credential store key for this caller
    pub fn session_id(&self) -> SessionId {
        SessionId::new(self.session_user_id.clone())
    }
}
