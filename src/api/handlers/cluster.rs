//! Cluster membership handlers: join, remove, and the node listing.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::addr::normalize_addr;
use crate::api::response::ApiError;
use crate::store::StoreError;
use crate::AppState;

use super::{leader_fallback, timeout_param};

#[derive(Debug, Deserialize)]
struct JoinRequest {
    id: String,
    addr: String,
    #[serde(default = "default_voter")]
    voter: bool,
}

fn default_voter() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RemoveRequest {
    id: String,
}

#[derive(Debug, Serialize)]
struct NodeResponse {
    id: String,
    addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_addr: Option<String>,
    reachable: bool,
}

/// `POST /join`: add a node to the cluster.
pub async fn join(State(state): State<Arc<AppState>>, uri: Uri, body: Bytes) -> Response {
    let req: JoinRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return ApiError::BadRequest(format!("invalid join request: {e}")).into_response(),
    };
    if req.id.is_empty() || req.addr.is_empty() {
        return ApiError::BadRequest("join request requires id and addr".to_string())
            .into_response();
    }

    match state.store.join(&req.id, &req.addr, req.voter).await {
        Ok(()) => {
            tracing::info!(id = %req.id, addr = %req.addr, voter = req.voter, "node joined");
            Json(serde_json::json!({})).into_response()
        }
        Err(StoreError::NotLeader) => leader_fallback(&state, &uri).await,
        Err(e) => ApiError::from_store(e).into_response(),
    }
}

/// `DELETE /remove`: remove a node from the cluster.
pub async fn remove(State(state): State<Arc<AppState>>, uri: Uri, body: Bytes) -> Response {
    let req: RemoveRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return ApiError::BadRequest(format!("invalid remove request: {e}")).into_response()
        }
    };

    match state.store.remove(&req.id).await {
        Ok(()) => {
            tracing::info!(id = %req.id, "node removed");
            Json(serde_json::json!({})).into_response()
        }
        Err(StoreError::NotLeader) => leader_fallback(&state, &uri).await,
        Err(e) => ApiError::from_store(e).into_response(),
    }
}

/// `GET /nodes`: list cluster members, augmented with the API address each
/// member is reachable at when the cluster directory can resolve it.
pub async fn nodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let members = match state.store.nodes().await {
        Ok(m) => m,
        Err(e) => return ApiError::from_store(e).into_response(),
    };

    let resolve_timeout = timeout_param(&params, state.default_timeout);

    let mut out = Vec::with_capacity(members.len());
    for member in members {
        let resolved = tokio::time::timeout(
            resolve_timeout,
            state.cluster.node_api_addr(&member.addr),
        )
        .await;

        let api_addr = match resolved {
            Ok(Ok(addr)) => Some(normalize_addr(&addr)),
            _ => None,
        };
        out.push(NodeResponse {
            id: member.id,
            addr: member.addr,
            reachable: api_addr.is_some(),
            api_addr,
        });
    }

    Json(out).into_response()
}
