//! Aggregated introspection endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::api::response::ApiError;
use crate::AppState;

/// `GET /status`: one JSON document aggregating the gateway's own runtime
/// stats, the store's, the cluster directory's, and every registered status
/// source keyed by its registration key.
pub async fn status(State(state): State<Arc<AppState>>) -> Response {
    match full_status(state.as_ref()).await {
        Ok(doc) => Json(Value::Object(doc)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Assemble the full status document. Shared with the /debug/vars dump.
pub(crate) async fn full_status(state: &AppState) -> Result<Map<String, Value>, ApiError> {
    let store_stats = state.store.stats().await.map_err(ApiError::from_store)?;
    let cluster_stats = state
        .cluster
        .stats()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let mut doc = Map::new();

    doc.insert(
        "runtime".to_string(),
        json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "pid": std::process::id(),
            "uptime": format!("{:?}", state.start_time.elapsed()),
        }),
    );
    let auth = if state.credentials.is_some() {
        "enabled"
    } else {
        "disabled"
    };
    doc.insert(
        "http".to_string(),
        json!({
            "addr": state.bind_address,
            "auth": auth,
        }),
    );
    if !state.build_info.is_empty() {
        doc.insert(
            "build".to_string(),
            Value::Object(state.build_info.clone().into_iter().collect()),
        );
    }
    doc.insert("store".to_string(), store_stats);
    doc.insert("cluster".to_string(), cluster_stats);

    for (key, value) in state.registry.aggregate().await {
        doc.insert(key, value);
    }

    Ok(doc)
}
