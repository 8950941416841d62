//! HTTP handlers for the gateway server

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use wpbridge_core::{ConnectionReport, RemoteCredential, ToolInvocation, ToolResult};

use super::cookies::{clear_feature_cookies, site_cookie};
use super::error::ApiError;
use super::state::{AppState, ControlAccess, ReadAccess};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Candidate credential produced by the linking flow
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub base_url: String,
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub write_mode_enabled: bool,
}

impl ConnectRequest {
    fn into_credential(self, allow_insecure_http: bool) -> Result<RemoteCredential, ApiError> {
        let mut credential = RemoteCredential::new(&self.base_url, self.token)?
            .with_write_mode(self.write_mode_enabled);
        if let Some(refresh_token) = self.refresh_token.filter(|t| !t.trim().is_empty()) {
            credential = credential.with_refresh_token(refresh_token);
        }
        credential.validate(allow_insecure_http)?;
        Ok(credential)
    }
}

/// Connect/meta response
#[derive(Serialize)]
pub struct StatusResponse {
    pub connected: bool,
    #[serde(flatten)]
    pub report: ConnectionReport,
}

impl From<ConnectionReport> for StatusResponse {
    fn from(report: ConnectionReport) -> Self {
        Self {
            connected: report.state.is_connected(),
            report,
        }
    }
}

pub async fn connect(
    State(state): State<AppState>,
    ControlAccess(ctx): ControlAccess,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let credential = request.into_credential(state.allow_insecure_http)?;
    let base_url = credential.site_root().to_string();

    let report = state.manager.connect(&ctx.session_id(), credential).await?;

    let mut headers = HeaderMap::new();
    if let Some(cookie) = site_cookie(&base_url) {
        headers.insert(header::SET_COOKIE, cookie);
    }

    Ok((headers, Json(StatusResponse::from(report))))
}

pub async fn meta(
    State(state): State<AppState>,
    ReadAccess(ctx): ReadAccess,
) -> Result<Json<StatusResponse>, ApiError> {
    let report = state.manager.meta(&ctx.session_id()).await?;
    Ok(Json(report.into()))
}

pub async fn disconnect(
    State(state): State<AppState>,
    ControlAccess(ctx): ControlAccess,
) -> Result<impl IntoResponse, ApiError> {
    state.manager.disconnect(&ctx.session_id()).await?;

    Ok((clear_feature_cookies(), Json(json!({ "connected": false }))))
}

pub async fn call_tool(
    State(state): State<AppState>,
    ControlAccess(ctx): ControlAccess,
    payload: Result<Json<ToolInvocation>, JsonRejection>,
) -> Result<Json<ToolResult>, ApiError> {
    let Json(invocation) = payload?;
    if invocation.name.trim().is_empty() {
        return Err(ApiError::BadRequest("tool name must not be empty".to_string()));
    }

    let result = state.manager.call_tool(&ctx.session_id(), &invocation).await?;
    Ok(Json(result))
}

pub async fn list_tools(
    State(state): State<AppState>,
    ControlAccess(ctx): ControlAccess,
) -> Result<Json<ToolResult>, ApiError> {
    let result = state.manager.list_tools(&ctx.session_id()).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct WriteModeRequest {
    pub enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteModeResponse {
    pub write_mode_enabled: bool,
}

pub async fn set_write_mode(
    State(state): State<AppState>,
    ControlAccess(ctx): ControlAccess,
    payload: Result<Json<WriteModeRequest>, JsonRejection>,
) -> Result<Json<WriteModeResponse>, ApiError> {
    let Json(request) = payload?;

    let enabled = state
        .manager
        .set_write_mode(&ctx.session_id(), request.enabled)
        .await?;
    Ok(Json(WriteModeResponse {
        write_mode_enabled: enabled,
    }))
}
