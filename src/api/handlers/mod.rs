mod backup;
mod cluster;
mod db;
mod debug;
mod status;

use std::collections::HashMap;
use std::time::Duration;

use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::addr::normalize_addr;
use crate::api::response::ApiError;
use crate::redirect::{decide, form_redirect, LeaderDecision};
use crate::AppState;

pub use backup::{backup, load};
pub use cluster::{join, nodes, remove};
pub use db::{execute, query};
pub use debug::{expvar, pprof_cmdline, pprof_profile, pprof_symbol};
pub use status::status;

/// Read the `timeout` query parameter, falling back to `default` when the
/// parameter is absent or unparsable. Malformed input is never an error.
pub(crate) fn timeout_param(params: &HashMap<String, String>, default: Duration) -> Duration {
    match params.get("timeout") {
        Some(value) => humantime::parse_duration(value).unwrap_or(default),
        None => default,
    }
}

/// Whether a presence-style query flag (e.g. `noleader`, `timings`) was
/// supplied, with or without a value.
pub(crate) fn flag_param(params: &HashMap<String, String>, name: &str) -> bool {
    params.contains_key(name)
}

/// Resolve the current leader's externally reachable API address: the store
/// names the leader, the cluster directory maps it to an API address.
pub(crate) async fn leader_api_addr(state: &AppState) -> Option<String> {
    let leader = state.store.leader_addr().await.ok()?;
    if leader.is_empty() {
        return None;
    }
    match state.cluster.node_api_addr(&leader).await {
        Ok(addr) => Some(normalize_addr(&addr)),
        Err(e) => {
            tracing::warn!(leader = %leader, error = %e, "failed to resolve leader API address");
            None
        }
    }
}

/// The not-leader branch shared by every leader-sensitive handler: redirect
/// to the leader when its address resolves, 503 when the client cannot be
/// told where to go.
pub(crate) async fn leader_fallback(state: &AppState, uri: &Uri) -> Response {
    let resolved = leader_api_addr(state).await;
    match decide(true, resolved) {
        LeaderDecision::Redirect(addr) => {
            let location = form_redirect(uri, &addr);
            (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, location)],
            )
                .into_response()
        }
        _ => ApiError::Unavailable("leader address is not resolvable".to_string()).into_response(),
    }
}
