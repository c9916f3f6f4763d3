//! Universal middleware: build-version header, content-type defaulting, and
//! the per-route authorization gate.

use axum::extract::{Request, State};
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::auth::{self, PermissionCheck};
use crate::AppState;

/// Response header carrying the configured build version.
pub const VERSION_HEADER: HeaderName = HeaderName::from_static("x-quorum-version");

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Wraps every response, including 404s from the fallback: injects the
/// version header and defaults the content type to JSON. Handlers that set
/// a non-JSON content type (the backup stream) keep theirs.
pub async fn version_and_content_type(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    let json_default = match headers.get(CONTENT_TYPE) {
        None => true,
        Some(v) => v
            .to_str()
            .map(|s| s.starts_with("application/json"))
            .unwrap_or(false),
    };
    if json_default {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    }

    let version = state
        .build_info
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    if let Ok(value) = HeaderValue::from_str(version) {
        headers.insert(VERSION_HEADER, value);
    }

    response
}

/// Authorization gate, applied per route group with the permission that
/// group requires. Runs before the handler body; failure is a uniform 401
/// regardless of whether credentials or permissions were at fault.
pub async fn require_permission(
    State((state, check)): State<(Arc<AppState>, PermissionCheck)>,
    request: Request,
    next: Next,
) -> Response {
    if auth::authorize(state.credentials.as_deref(), request.headers(), &check) {
        next.run(request).await
    } else {
        ApiError::Unauthorized.into_response()
    }
}
