//! JSON error responses
//!
//! Body shape: `{"error": kind, "message": ..., ...}` with kind-specific
//! extra fields.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wpbridge_core::{BridgeError, CredentialError};

/// Error returned by gateway handlers and extractors.
#[derive(Debug)]
pub enum ApiError {
    /// Classified bridge failure
    Bridge(BridgeError),
    /// Candidate credential failed validation
    InvalidCredential(CredentialError),
    /// Request body could not be parsed
    BadRequest(String),
    /// Request body larger than the gateway accepts
    PayloadTooLarge { limit: usize },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Bridge(err) => bridge_status(err),
            ApiError::InvalidCredential(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// HTTP status for a bridge error kind
pub fn bridge_status(err: &BridgeError) -> StatusCode {
    match err {
        BridgeError::Unauthorized(_) | BridgeError::Auth { .. } => StatusCode::UNAUTHORIZED,
        BridgeError::Forbidden(_) => StatusCode::FORBIDDEN,
        BridgeError::Connection { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
        BridgeError::Connection { .. } | BridgeError::Protocol(_) => StatusCode::BAD_GATEWAY,
        BridgeError::IncompatibleVersion { .. } => StatusCode::CONFLICT,
        BridgeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        ApiError::Bridge(err)
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::InvalidCredential(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Bridge(err) => {
                let mut body = json!({
                    "error": err.kind(),
                    "message": err.to_string(),
                    "retryable": err.is_retryable(),
                });
                match err {
                    BridgeError::Auth { .. } => {
                        body["reconnectRequired"] = json!(true);
                    }
                    BridgeError::IncompatibleVersion {
                        plugin_version,
                        min_required,
                    } => {
                        body["pluginVersion"] = json!(plugin_version);
                        body["minRequired"] = json!(min_required);
                    }
                    BridgeError::Unauthorized(_) => {
                        body["connected"] = json!(false);
                    }
                    _ => {}
                }
                body
            }
            ApiError::InvalidCredential(err) => json!({
                "error": "invalid_credential",
                "message": err.to_string(),
            }),
            ApiError::BadRequest(message) => json!({
                "error": "bad_request",
                "message": message,
            }),
            ApiError::PayloadTooLarge { limit } => json!({
                "error": "payload_too_large",
                "message": format!("request body exceeds {} bytes", limit),
            }),
        };

        (status, Json(body)).into_response()
    }
}
