//! Connection Lifecycle Manager
//!
//! Orchestrates connect, meta, disconnect and tool calls for one user
//! session over a [`CredentialStore`] and a [`ClientFactory`].
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──handshake ok + compatible──▶ Connected
//!      ▲                          │                                       │
//!      │                          └──── any failure (nothing stored) ─────┤
//!      └──────────────── disconnect() / remote auth rejection ────────────┘
//! ```
//!
//! A protocol client is built per operation and dropped at its end. The
//! store is only written after a successful, compatible handshake.

use std::sync::Arc;

use tracing::{debug, info, warn};
use wpbridge_core::{
    check_compatibility, BridgeError, BridgeResult, ConnectionReport, ConnectionState,
    CredentialStore, HandshakeResult, RemoteCredential, SessionId, ToolInvocation, ToolResult,
};
use wpbridge_mcp::{ClientError, ClientFactory, ProtocolClient};

/// Per-session orchestrator of the bridge operations.
pub struct ConnectionManager {
    store: Arc<dyn CredentialStore>,
    clients: Arc<dyn ClientFactory>,
}

impl ConnectionManager {
    pub fn new(store: Arc<dyn CredentialStore>, clients: Arc<dyn ClientFactory>) -> Self {
        Self { store, clients }
    }

    /// Handshake with a candidate credential and persist it on success.
    pub async fn connect(
        &self,
        session: &SessionId,
        candidate: RemoteCredential,
    ) -> BridgeResult<ConnectionReport> {
        require_identified(session)?;

        debug!(
            session = %session.short(),
            base_url = %candidate.origin(),
            state = ?ConnectionState::Connecting,
            "[Lifecycle] Connecting"
        );

        // Failures here leave the store untouched: a previous credential of
        // this session stays in place, a new one is never written.
        let (_client, handshake) = self.open_client(&candidate).await.map_err(|e| {
            let err = BridgeError::from(e);
            warn!(session = %session.short(), kind = err.kind(), "[Lifecycle] Connect failed: {}", err);
            err
        })?;

        let compatibility = check_compatibility(handshake.plugin_version());
        if !compatibility.ok {
            warn!(
                session = %session.short(),
                plugin_version = %compatibility.plugin_version,
                min_required = %compatibility.min_required,
                "[Lifecycle] Plugin too old, credential not stored"
            );
            return Err(BridgeError::IncompatibleVersion {
                plugin_version: compatibility.plugin_version,
                min_required: compatibility.min_required,
            });
        }

        self.store.save(session, &candidate).await?;

        info!(
            session = %session.short(),
            base_url = %candidate.origin(),
            plugin_version = %compatibility.plugin_version,
            "[Lifecycle] Connected"
        );

        Ok(ConnectionReport {
            state: ConnectionState::Connected,
            handshake,
            compatibility,
        })
    }

    /// Fresh handshake with the stored credential.
    ///
    /// The verdict is reported as-is; an outdated plugin does not fail meta.
    pub async fn meta(&self, session: &SessionId) -> BridgeResult<ConnectionReport> {
        let credential = self.require_credential(session).await?;

        let (_client, handshake) = match self.open_client(&credential).await {
            Ok(opened) => opened,
            Err(e) => return Err(self.fail(session, &credential, e).await),
        };
        let compatibility = check_compatibility(handshake.plugin_version());

        debug!(
            session = %session.short(),
            compatible = compatibility.ok,
            "[Lifecycle] Meta handshake complete"
        );

        Ok(ConnectionReport {
            state: ConnectionState::Connected,
            handshake,
            compatibility,
        })
    }

    /// Drop the session's credential. Purely local, never contacts the remote.
    pub async fn disconnect(&self, session: &SessionId) -> BridgeResult<()> {
        if !session.is_identified() {
            return Ok(());
        }

        self.store.clear(session).await?;
        info!(session = %session.short(), "[Lifecycle] Disconnected");
        Ok(())
    }

    /// Handshake, then invoke one tool.
    pub async fn call_tool(
        &self,
        session: &SessionId,
        invocation: &ToolInvocation,
    ) -> BridgeResult<ToolResult> {
        let (client, credential) = self.ready_client(session).await?;

        debug!(session = %session.short(), tool = %invocation.name, "[Lifecycle] Calling tool");

        match client.call_tool(invocation).await {
            Ok(result) => Ok(result),
            Err(e) => Err(self.fail(session, &credential, e).await),
        }
    }

    /// Handshake, then list the plugin's tools.
    pub async fn list_tools(&self, session: &SessionId) -> BridgeResult<ToolResult> {
        let (client, credential) = self.ready_client(session).await?;

        match client.list_tools().await {
            Ok(result) => Ok(result),
            Err(e) => Err(self.fail(session, &credential, e).await),
        }
    }

    /// Flip the stored credential's write-mode flag in place.
    ///
    /// Never recreates a credential that a concurrent disconnect removed.
    pub async fn set_write_mode(&self, session: &SessionId, enabled: bool) -> BridgeResult<bool> {
        require_identified(session)?;

        if !self.store.update_write_mode(session, enabled).await? {
            debug!(session = %session.short(), "[Lifecycle] No stored credential");
            return Err(BridgeError::Unauthorized("not connected".to_string()));
        }

        info!(session = %session.short(), enabled, "[Lifecycle] Write mode updated");
        Ok(enabled)
    }

    async fn require_credential(&self, session: &SessionId) -> BridgeResult<RemoteCredential> {
        require_identified(session)?;

        self.store.load(session).await.ok_or_else(|| {
            debug!(session = %session.short(), "[Lifecycle] No stored credential");
            BridgeError::Unauthorized("not connected".to_string())
        })
    }

    async fn open_client(
        &self,
        credential: &RemoteCredential,
    ) -> Result<(Box<dyn ProtocolClient>, HandshakeResult), ClientError> {
        let mut client = self.clients.create(credential)?;
        let handshake = client.initialize().await?;
        Ok((client, handshake))
    }

    /// Initialized, compatible client for the stored credential, along with
    /// the credential it was built from.
    async fn ready_client(
        &self,
        session: &SessionId,
    ) -> BridgeResult<(Box<dyn ProtocolClient>, RemoteCredential)> {
        let credential = self.require_credential(session).await?;

        let (client, handshake) = match self.open_client(&credential).await {
            Ok(opened) => opened,
            Err(e) => return Err(self.fail(session, &credential, e).await),
        };

        let compatibility = check_compatibility(handshake.plugin_version());
        if !compatibility.ok {
            return Err(BridgeError::IncompatibleVersion {
                plugin_version: compatibility.plugin_version,
                min_required: compatibility.min_required,
            });
        }

        Ok((client, credential))
    }

    /// Classify a failure against `rejected`, dropping it from the store
    /// when the remote refused it.
    ///
    /// Only that exact grant is cleared: a credential saved by a reconnect
    /// while the call was in flight stays.
    async fn fail(&self, session: &SessionId, rejected: &RemoteCredential, e: ClientError) -> BridgeError {
        let err = BridgeError::from(e);

        if err.reconnect_required() {
            match self.store.clear_if(session, rejected).await {
                Ok(true) => {
                    warn!(session = %session.short(), "[Lifecycle] Remote rejected credential, cleared it")
                }
                Ok(false) => debug!(
                    session = %session.short(),
                    "[Lifecycle] Remote rejected a credential that was already replaced"
                ),
                Err(clear_err) => warn!(
                    session = %session.short(),
                    "[Lifecycle] Failed to clear rejected credential: {}",
                    clear_err
                ),
            }
        } else {
            warn!(session = %session.short(), kind = err.kind(), "[Lifecycle] Remote call failed: {}", err);
        }

        err
    }
}

fn require_identified(session: &SessionId) -> BridgeResult<()> {
    if session.is_identified() {
        Ok(())
    } else {
        Err(BridgeError::Unauthorized("no valid session".to_string()))
    }
}
