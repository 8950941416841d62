//! Credential store contract
//!
//! Defines how per-session credentials are kept without specifying the
//! backing medium (in-memory map, SQLite record, sealed cookie, ...).

use async_trait::async_trait;

use crate::domain::{RemoteCredential, SessionId};
use crate::error::StorageError;

/// Result type for credential store writes
pub type StoreResult<T> = Result<T, StorageError>;

/// Per-session credential storage.
///
/// Implementations must make `save` atomic: a concurrent `load` observes
/// either the previous credential or the new one, never a mix. Entries of
/// one session are unreachable through any other session id.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store `credential` for `session`, replacing any previous one.
    ///
    /// Fails with [`StorageError::UnidentifiedSession`] for a blank session id.
    async fn save(&self, session: &SessionId, credential: &RemoteCredential) -> StoreResult<()>;

    /// Read the credential for `session`.
    ///
    /// Absence is the normal not-yet-connected state. Unreadable entries are
    /// reported as absent.
    async fn load(&self, session: &SessionId) -> Option<RemoteCredential>;

    /// Drop the credential for `session`. Clearing an absent entry succeeds.
    async fn clear(&self, session: &SessionId) -> StoreResult<()>;

    /// Set the write-mode flag of the stored credential in one step.
    ///
    /// Returns `false` when the session holds no credential; nothing is
    /// written then, so a concurrent `clear` is never undone.
    async fn update_write_mode(&self, session: &SessionId, enabled: bool) -> StoreResult<bool>;

    /// Drop the credential for `session` only if it still carries the grant
    /// of `expected` (see [`RemoteCredential::same_grant`]).
    ///
    /// Returns whether an entry was removed. A credential saved after
    /// `expected` was read survives.
    async fn clear_if(&self, session: &SessionId, expected: &RemoteCredential) -> StoreResult<bool>;
}
