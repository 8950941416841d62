//! In-process credential store.
//!
//! Suitable for a single gateway instance; credentials are lost on restart,
//! which forces users to reconnect.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use wpbridge_core::{CredentialStore, RemoteCredential, SessionId, StorageError, StoreResult};

/// DashMap-backed store. Each entry is replaced whole, so readers never see
/// a partially written credential.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<SessionId, RemoteCredential>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding a credential
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, session: &SessionId, credential: &RemoteCredential) -> StoreResult<()> {
        if !session.is_identified() {
            return Err(StorageError::UnidentifiedSession);
        }

        self.entries.insert(session.clone(), credential.clone());
        debug!(
            "[CredentialStore] Saved credential for session {} ({})",
            session.short(),
            credential.origin()
        );
        Ok(())
    }

    async fn load(&self, session: &SessionId) -> Option<RemoteCredential> {
        self.entries.get(session).map(|entry| entry.value().clone())
    }

    async fn clear(&self, session: &SessionId) -> StoreResult<()> {
        if self.entries.remove(session).is_some() {
            debug!("[CredentialStore] Cleared credential for session {}", session.short());
        }
        Ok(())
    }

    async fn update_write_mode(&self, session: &SessionId, enabled: bool) -> StoreResult<bool> {
        match self.entries.get_mut(session) {
            Some(mut entry) => {
                entry.write_mode_enabled = enabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_if(&self, session: &SessionId, expected: &RemoteCredential) -> StoreResult<bool> {
        let removed = self
            .entries
            .remove_if(session, |_, current| current.same_grant(expected))
            .is_some();
        if removed {
            debug!("[CredentialStore] Cleared credential for session {}", session.short());
        }
        Ok(removed)
    }
}
