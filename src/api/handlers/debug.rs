//! Diagnostic sub-routes, registered only when explicitly enabled.
//!
//! When disabled these paths are simply absent (404), indistinguishable
//! from any other unregistered path.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::AppState;

use super::status::full_status;

/// `GET /debug/vars`: runtime variable dump: the same aggregated document
/// as /status.
pub async fn expvar(State(state): State<Arc<AppState>>) -> Response {
    match full_status(state.as_ref()).await {
        Ok(doc) => Json(Value::Object(doc)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /debug/pprof/cmdline`: the process command line.
pub async fn pprof_cmdline() -> Response {
    let args: Vec<String> = std::env::args().collect();
    Json(serde_json::json!({ "cmdline": args })).into_response()
}

/// `GET /debug/pprof/profile`: CPU profiling is runtime-specific and not
/// supported by this gateway.
pub async fn pprof_profile() -> Response {
    profiling_unsupported()
}

/// `GET /debug/pprof/symbol`: symbol resolution is runtime-specific and
/// not supported by this gateway.
pub async fn pprof_symbol() -> Response {
    profiling_unsupported()
}

fn profiling_unsupported() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "error": "profiling is not supported" })),
    )
        .into_response()
}
