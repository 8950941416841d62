//! Shared handler state and access extractors

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use wpbridge_core::AccessContext;

use super::error::ApiError;
use crate::auth::AccessGuard;
use crate::lifecycle::ConnectionManager;

/// App state shared by all routes
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConnectionManager>,
    pub guard: Arc<AccessGuard>,
    /// Accept `http://` base URLs on connect
    pub allow_insecure_http: bool,
}

impl FromRef<AppState> for Arc<AccessGuard> {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

impl FromRef<AppState> for Arc<ConnectionManager> {
    fn from_ref(state: &AppState) -> Self {
        state.manager.clone()
    }
}

/// Caller of a control request: allow-listed origin and a valid session.
///
/// Runs before the body is read, so a rejected request never reaches the
/// credential store.
pub struct ControlAccess(pub AccessContext);

impl<S> FromRequestParts<S> for ControlAccess
where
    Arc<AccessGuard>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Arc::<AccessGuard>::from_ref(state);
        let ctx = guard.authorize(&parts.headers, true)?;
        Ok(ControlAccess(ctx))
    }
}

/// Caller of a read-only request: valid session, origin checked if declared.
pub struct ReadAccess(pub AccessContext);

impl<S> FromRequestParts<S> for ReadAccess
where
    Arc<AccessGuard>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = Arc::<AccessGuard>::from_ref(state);
        let ctx = guard.authorize_read(&parts.headers)?;
        Ok(ReadAccess(ctx))
    }
}
