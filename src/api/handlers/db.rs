//! Execute and query handlers: thin translation from HTTP to store calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::response::ApiError;
use crate::store::{ExecuteRequest, QueryRequest, StoreError};
use crate::AppState;

use super::{flag_param, leader_fallback, timeout_param};

#[derive(Debug, Serialize)]
struct DbResponse<T: Serialize> {
    results: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<f64>,
}

/// `POST /db/execute`: apply a JSON array of write statements.
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    body: Bytes,
) -> Response {
    let statements: Vec<String> = match serde_json::from_slice(&body) {
        Ok(stmts) => stmts,
        Err(e) => {
            return ApiError::BadRequest(format!("invalid statement set: {e}")).into_response()
        }
    };
    if statements.is_empty() {
        return ApiError::BadRequest("no statements".to_string()).into_response();
    }

    let req = ExecuteRequest {
        statements,
        transaction: flag_param(&params, "transaction"),
        timeout: timeout_param(&params, state.default_timeout),
    };

    let start = Instant::now();
    match state.store.execute(req).await {
        Ok(results) => db_response(results, &params, start),
        Err(StoreError::NotLeader) => leader_fallback(&state, &uri).await,
        Err(e) => ApiError::from_store(e).into_response(),
    }
}

/// `GET /db/query?q=...`: run a read query.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    let q = match params.get("q") {
        Some(q) if !q.is_empty() => q.clone(),
        _ => return ApiError::BadRequest("missing query parameter 'q'".to_string()).into_response(),
    };

    // Read consistency: none serves from the local node, weak (the default)
    // from the leader, strong verifies leadership through consensus first.
    let (leader, verify) = match params.get("level").map(String::as_str) {
        Some("none") => (false, false),
        Some("strong") => (true, true),
        _ => (true, false),
    };

    let req = QueryRequest {
        statements: vec![q],
        transaction: flag_param(&params, "transaction"),
        leader,
        verify,
        timeout: timeout_param(&params, state.default_timeout),
    };

    let start = Instant::now();
    match state.store.query(req).await {
        Ok(rows) => db_response(rows, &params, start),
        Err(StoreError::NotLeader) => leader_fallback(&state, &uri).await,
        Err(e) => ApiError::from_store(e).into_response(),
    }
}

fn db_response<T: Serialize>(
    results: Vec<T>,
    params: &HashMap<String, String>,
    start: Instant,
) -> Response {
    let time = flag_param(params, "timings").then(|| start.elapsed().as_secs_f64());
    Json(DbResponse { results, time }).into_response()
}
