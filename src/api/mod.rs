//! HTTP surface: router assembly and the middleware chain.

pub mod handlers;
pub mod middleware;
pub mod response;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{Permission, PermissionCheck, STATUS_OR_READY};
use crate::AppState;
use middleware::{require_permission, version_and_content_type};

/// Build the full dispatch table.
///
/// Each route group carries the authorization gate for the permission it
/// requires; the version/content-type middleware wraps everything,
/// including the 404 fallback. Unknown paths are 404, known paths with the
/// wrong method 405.
pub fn create_router(state: Arc<AppState>) -> Router {
    let gate = |check: PermissionCheck| {
        from_fn_with_state((Arc::clone(&state), check), require_permission)
    };

    let mut router = Router::new()
        .merge(
            Router::new()
                .route("/db/execute", post(handlers::execute))
                .route_layer(gate(PermissionCheck::Single(Permission::Execute))),
        )
        .merge(
            Router::new()
                .route("/db/query", get(handlers::query))
                .route_layer(gate(PermissionCheck::Single(Permission::Query))),
        )
        .merge(
            Router::new()
                .route("/db/backup", get(handlers::backup))
                .route_layer(gate(PermissionCheck::Single(Permission::Backup))),
        )
        .merge(
            Router::new()
                .route("/db/load", post(handlers::load))
                .route_layer(gate(PermissionCheck::Single(Permission::Load))),
        )
        .merge(
            Router::new()
                .route("/join", post(handlers::join))
                .route_layer(gate(PermissionCheck::Single(Permission::Join))),
        )
        .merge(
            Router::new()
                .route("/remove", delete(handlers::remove))
                .route_layer(gate(PermissionCheck::Single(Permission::Remove))),
        )
        .merge(
            Router::new()
                .route("/status", get(handlers::status))
                .route_layer(gate(PermissionCheck::Single(Permission::Status))),
        )
        .merge(
            Router::new()
                .route("/nodes", get(handlers::nodes))
                .route_layer(gate(STATUS_OR_READY)),
        );

    // Diagnostic sub-routes exist only when explicitly enabled; disabled
    // means absent, not forbidden.
    if state.expvar {
        router = router.merge(
            Router::new()
                .route("/debug/vars", get(handlers::expvar))
                .route_layer(gate(STATUS_OR_READY)),
        );
    }
    if state.pprof {
        router = router.merge(
            Router::new()
                .route("/debug/pprof/cmdline", get(handlers::pprof_cmdline))
                .route("/debug/pprof/profile", get(handlers::pprof_profile))
                .route("/debug/pprof/symbol", get(handlers::pprof_symbol))
                .route_layer(gate(STATUS_OR_READY)),
        );
    }

    router
        .layer(from_fn_with_state(
            Arc::clone(&state),
            version_and_content_type,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
