//! SQLite implementation of CredentialStore with sealed token fields.
//!
//! One row per session. Only the token and refresh token are encrypted; the
//! base URL and write-mode flag stay in plaintext.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use url::Url;
use wpbridge_core::{CredentialStore, RemoteCredential, SessionId, StorageError, StoreResult};

use crate::crypto::FieldEncryptor;
use crate::Database;

/// Raw row data extracted from SQLite before decryption.
struct RawCredentialRow {
    base_url: String,
    token: String,
    refresh_token: Option<String>,
    write_mode_enabled: bool,
}

/// SQLite-backed credential store with AES-256-GCM sealed tokens.
///
/// Sealed values are bound to their session id, so a row copied under
/// another session id fails to open and loads as absent.
pub struct SqliteCredentialStore {
    db: Arc<Mutex<Database>>,
    encryptor: Arc<FieldEncryptor>,
}

impl SqliteCredentialStore {
    pub fn new(db: Arc<Mutex<Database>>, encryptor: Arc<FieldEncryptor>) -> Self {
        Self { db, encryptor }
    }

    fn extract_row(row: &rusqlite::Row) -> rusqlite::Result<RawCredentialRow> {
        Ok(RawCredentialRow {
            base_url: row.get(0)?,
            token: row.get(1)?,
            refresh_token: row.get(2)?,
            write_mode_enabled: row.get::<_, i64>(3)? != 0,
        })
    }

    fn build_credential(&self, session: &SessionId, row: RawCredentialRow) -> Result<RemoteCredential> {
        let context = session.as_str();
        let token = self
            .encryptor
            .open(&row.token, context)
            .context("Failed to open sealed token")?;
        let refresh_token = row
            .refresh_token
            .map(|sealed| self.encryptor.open(&sealed, context))
            .transpose()
            .context("Failed to open sealed refresh token")?;

        Ok(RemoteCredential {
            base_url: Url::parse(&row.base_url).context("Stored base URL is invalid")?,
            token: token.to_string(),
            refresh_token: refresh_token.map(|t| t.to_string()),
            write_mode_enabled: row.write_mode_enabled,
        })
    }

    fn select_row(db: &Database, session: &SessionId) -> rusqlite::Result<Option<RawCredentialRow>> {
        db.connection()
            .query_row(
                "SELECT base_url, token, refresh_token, write_mode_enabled
                 FROM session_credentials WHERE session_id = ?1",
                params![session.as_str()],
                Self::extract_row,
            )
            .optional()
    }

    async fn read_row(&self, session: &SessionId) -> Result<Option<RawCredentialRow>> {
        let db = self.db.lock().await;
        Ok(Self::select_row(&db, session)?)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn save(&self, session: &SessionId, credential: &RemoteCredential) -> StoreResult<()> {
        if !session.is_identified() {
            return Err(StorageError::UnidentifiedSession);
        }

        let context = session.as_str();
        let token = self
            .encryptor
            .seal(&credential.token, context)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .map(|t| self.encryptor.seal(t, context))
            .transpose()
            .map_err(|e| StorageError::Encryption(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT INTO session_credentials (session_id, base_url, token, refresh_token, write_mode_enabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(session_id) DO UPDATE SET
                    base_url = excluded.base_url,
                    token = excluded.token,
                    refresh_token = excluded.refresh_token,
                    write_mode_enabled = excluded.write_mode_enabled,
                    updated_at = excluded.updated_at",
                params![
                    context,
                    credential.base_url.as_str(),
                    token,
                    refresh_token,
                    credential.write_mode_enabled as i64,
                    now,
                ],
            )
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        debug!(
            "[CredentialStore] Saved sealed credential for session {} ({})",
            session.short(),
            credential.origin()
        );
        Ok(())
    }

    async fn load(&self, session: &SessionId) -> Option<RemoteCredential> {
        let row = match self.read_row(session).await {
            Ok(row) => row?,
            Err(e) => {
                error!(
                    "[CredentialStore] Failed to read credential for session {}: {:#}",
                    session.short(),
                    e
                );
                return None;
            }
        };

        match self.build_credential(session, row) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(
                    "[CredentialStore] Discarding unreadable credential for session {}: {:#}",
                    session.short(),
                    e
                );
                None
            }
        }
    }

    async fn clear(&self, session: &SessionId) -> StoreResult<()> {
        let db = self.db.lock().await;
        let removed = db
            .connection()
            .execute(
                "DELETE FROM session_credentials WHERE session_id = ?1",
                params![session.as_str()],
            )
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        if removed > 0 {
            debug!("[CredentialStore] Cleared credential for session {}", session.short());
        }
        Ok(())
    }

    async fn update_write_mode(&self, session: &SessionId, enabled: bool) -> StoreResult<bool> {
        let db = self.db.lock().await;
        let updated = db
            .connection()
            .execute(
                "UPDATE session_credentials SET write_mode_enabled = ?2, updated_at = ?3
                 WHERE session_id = ?1",
                params![session.as_str(), enabled as i64, Utc::now().to_rfc3339()],
            )
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(updated > 0)
    }

    async fn clear_if(&self, session: &SessionId, expected: &RemoteCredential) -> StoreResult<bool> {
        // Held across the read and the delete so no save can slip in between.
        let db = self.db.lock().await;
        let row = Self::select_row(&db, session).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let Some(row) = row else {
            return Ok(false);
        };

        let sealed = row.token.clone();
        let matches = match self.build_credential(session, row) {
            Ok(current) => current.same_grant(expected),
            // An unreadable row is useless to everyone; drop it.
            Err(_) => true,
        };
        if !matches {
            return Ok(false);
        }

        let removed = db
            .connection()
            .execute(
                "DELETE FROM session_credentials WHERE session_id = ?1 AND token = ?2",
                params![session.as_str(), sealed],
            )
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        if removed > 0 {
            debug!("[CredentialStore] Cleared credential for session {}", session.short());
        }
        Ok(removed > 0)
    }
}
