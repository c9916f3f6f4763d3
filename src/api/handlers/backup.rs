//! Backup streaming and restore handlers.
//!
//! Both endpoints are leader-sensitive: unless the caller opts out with
//! `noleader`, a backup must come from the leader, and a restore must be
//! applied through it. The not-leader branch is the shared
//! redirect-or-503 fallback.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::middleware::CONTENT_TYPE_OCTET_STREAM;
use crate::api::response::ApiError;
use crate::store::{BackupFormat, StoreError};
use crate::AppState;

use super::{flag_param, leader_fallback};

/// `GET /db/backup?fmt=...&noleader`: stream a backup artifact.
///
/// The stream is handed straight to the response body: a client disconnect
/// drops the stream (cancelling the store-side backup), and a mid-stream
/// store error aborts the response. No retries at this layer.
pub async fn backup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    let format = params
        .get("fmt")
        .map(|f| BackupFormat::from_param(f))
        .unwrap_or_default();
    let leader_required = !flag_param(&params, "noleader");

    match state.store.backup(leader_required, format).await {
        Ok(stream) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)
            .body(Body::from_stream(stream))
            .unwrap_or_else(|_| {
                ApiError::Internal("failed to build backup response".to_string()).into_response()
            }),
        Err(StoreError::NotLeader) => leader_fallback(&state, &uri).await,
        Err(e) => ApiError::from_store(e).into_response(),
    }
}

/// `POST /db/load`: forward a restore payload to the store.
///
/// Mirrors the backup endpoint's leader-affinity policy: a not-leader
/// store is answered with a redirect to the leader (or 503 when the leader
/// is unresolvable).
pub async fn load(State(state): State<Arc<AppState>>, uri: Uri, body: Bytes) -> Response {
    if body.is_empty() {
        return ApiError::BadRequest("empty load payload".to_string()).into_response();
    }

    match state.store.load(body).await {
        Ok(()) => Json(serde_json::json!({ "results": [] })).into_response(),
        Err(StoreError::NotLeader) => leader_fallback(&state, &uri).await,
        Err(e) => ApiError::from_store(e).into_response(),
    }
}
