//! HTTP request/response logging middleware
//!
//! One entry line and one exit line per request, tagged with a trace id.
//! Bodies are logged at DEBUG and redacted on paths carrying credentials.

use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError};
use tracing::{debug, warn, Instrument};

use super::error::ApiError;
use super::MAX_REQUEST_BODY_BYTES;
use crate::logging::{RequestSpan, TraceContext};

/// Maximum body size to log (64KB)
const MAX_BODY_LOG_SIZE: usize = 64 * 1024;

/// Paths whose request bodies carry tokens
const SENSITIVE_PATHS: &[&str] = &["/api/mcp/connect"];

/// Headers that are never logged in clear
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

pub fn is_sensitive_path(path: &str) -> bool {
    SENSITIVE_PATHS.iter().any(|p| path.starts_with(p))
}

/// Compact header dump for DEBUG logs
fn redact_headers_compact(headers: &axum::http::HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| {
            matches!(
                name.as_str(),
                "content-type" | "origin" | "referer" | "user-agent" | "authorization" | "cookie"
            )
        })
        .map(|(name, value)| {
            if SENSITIVE_HEADERS.contains(&name.as_str()) {
                format!("{}=[REDACTED]", name)
            } else {
                format!("{}={:?}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a body for logging
pub fn format_body(bytes: &[u8], redact: bool) -> String {
    if redact {
        return "[REDACTED]".to_string();
    }

    if bytes.is_empty() {
        return "[empty]".to_string();
    }

    if bytes.len() > MAX_BODY_LOG_SIZE {
        return format!("[{} bytes]", bytes.len());
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(text) {
                return serde_json::to_string(&json).unwrap_or_else(|_| text.to_string());
            }
            match text.char_indices().nth(200) {
                Some((cut, _)) => format!("{}...", &text[..cut]),
                None => text.to_string(),
            }
        }
        Err(_) => format!("[binary: {} bytes]", bytes.len()),
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Whether a body read failed because the size cap was hit
fn hit_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Summarize a gateway response body: the error kind or the top-level keys
fn summarize_response(bytes: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    let obj = json.as_object()?;

    if let Some(kind) = obj.get("error").and_then(|e| e.as_str()) {
        return Some(format!("error: {}", kind));
    }

    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    Some(format!("{{{}}}", keys.join(", ")))
}

/// Logging middleware for requests and responses
pub async fn http_logging_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let is_sensitive = is_sensitive_path(&path);

    let ctx = TraceContext::new(&method, &path);
    let span = RequestSpan::enter(&ctx);

    async move {
        RequestSpan::log_entry(&ctx);
        debug!(
            trace_id = %ctx.trace_id,
            headers = %redact_headers_compact(request.headers()),
            "Request headers"
        );

        let too_large = ApiError::PayloadTooLarge {
            limit: MAX_REQUEST_BODY_BYTES,
        };
        if declared_length(request.headers()).is_some_and(|len| len > MAX_REQUEST_BODY_BYTES as u64) {
            warn!(trace_id = %ctx.trace_id, "Declared request body too large");
            let response = too_large.into_response();
            RequestSpan::log_exit(&ctx, response.status().as_u16(), Some("error: payload_too_large"));
            return Ok(response);
        }

        let (parts, body) = request.into_parts();
        let body_bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) if hit_length_limit(&e) => {
                warn!(trace_id = %ctx.trace_id, "Request body grew past the size limit");
                let response = too_large.into_response();
                RequestSpan::log_exit(&ctx, response.status().as_u16(), Some("error: payload_too_large"));
                return Ok(response);
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, "Failed to read request body: {}", e);
                return Err(StatusCode::BAD_REQUEST);
            }
        };

        if !body_bytes.is_empty() {
            debug!(
                trace_id = %ctx.trace_id,
                body = %format_body(&body_bytes, is_sensitive),
                "Request body"
            );
        }

        let mut request = Request::from_parts(parts, Body::from(body_bytes));
        request.extensions_mut().insert(ctx.clone());

        let response = next.run(request).await;

        let (parts, body) = response.into_parts();
        let status = parts.status;
        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, "Failed to read response body: {}", e);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        let summary = summarize_response(&body_bytes);
        RequestSpan::log_exit(&ctx, status.as_u16(), summary.as_deref());

        Ok(Response::from_parts(parts, Body::from(body_bytes)))
    }
    .instrument(span)
    .await
}
