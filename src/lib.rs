//! quorum-gateway - the client-facing HTTP gateway for a replicated,
//! leader-based SQL store.
//!
//! This crate provides the leader-aware request-handling and access-control
//! layer in front of a consensus cluster:
//! - Leader-affinity routing: write-ish and backup requests either serve
//!   locally, redirect to the current leader, or fail unambiguously
//! - HTTP Basic authentication with fine-grained per-endpoint permissions
//! - Streaming database backups with format negotiation
//! - A pluggable status registry aggregated on /status
//! - Optional TLS with transparent HTTP/2 negotiation
//!
//! The consensus engine, SQL execution, and credential storage are
//! collaborators consumed through the [`store::Store`],
//! [`cluster::ClusterDirectory`], and [`auth::CredentialStore`] traits.

pub mod addr;
pub mod api;
pub mod auth;
pub mod cluster;
pub mod config;
pub mod redirect;
pub mod service;
pub mod status;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use auth::CredentialStore;
use cluster::ClusterDirectory;
use status::StatusRegistry;
use store::Store;

pub use service::Service;

/// Shared per-request state, built by the `Service` when it starts.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cluster: Arc<dyn ClusterDirectory>,
    /// Absent means authentication is disabled.
    pub credentials: Option<Arc<dyn CredentialStore>>,
    pub registry: Arc<StatusRegistry>,
    pub build_info: HashMap<String, serde_json::Value>,
    pub bind_address: String,
    pub default_timeout: Duration,
    pub expvar: bool,
    pub pprof: bool,
    pub start_time: Instant,
}
