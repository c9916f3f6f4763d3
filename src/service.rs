//! Service lifecycle: listener ownership, optional TLS/HTTP2, and
//! coordinated start/stop.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::api;
use crate::auth::CredentialStore;
use crate::cluster::ClusterDirectory;
use crate::config::GatewayConfig;
use crate::status::{StatusError, StatusRegistry, Statuser};
use crate::store::Store;
use crate::AppState;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid bind address {0}: {1}")]
    InvalidBindAddress(String, std::net::AddrParseError),
    #[error("failed to load TLS material: {0}")]
    Tls(std::io::Error),
    #[error("failed to bind {0}")]
    BindFailed(String),
    #[error("service already started")]
    AlreadyStarted,
}

/// The gateway instance.
///
/// Constructed once with its three collaborators; the credential store may
/// be absent, which disables authentication entirely. Flags and build
/// metadata are plain fields set before [`Service::start`].
pub struct Service {
    bind_address: String,
    store: Arc<dyn Store>,
    cluster: Arc<dyn ClusterDirectory>,
    credentials: Option<Arc<dyn CredentialStore>>,
    registry: Arc<StatusRegistry>,

    /// X.509 certificate for serving TLS; with `key_file` set the listener
    /// serves TLS and negotiates HTTP/2 via ALPN.
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    /// Expose the runtime variable dump at /debug/vars.
    pub expvar: bool,
    /// Expose the profiling routes under /debug/pprof.
    pub pprof: bool,
    /// Build metadata surfaced through the version response header and the
    /// status document. The `version` field feeds the header.
    pub build_info: HashMap<String, serde_json::Value>,
    /// Default per-request timeout when no `timeout` parameter is given.
    pub default_timeout: Duration,

    handle: Option<Handle>,
    server_task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl Service {
    pub fn new(
        bind_address: impl Into<String>,
        store: Arc<dyn Store>,
        cluster: Arc<dyn ClusterDirectory>,
        credentials: Option<Arc<dyn CredentialStore>>,
    ) -> Self {
        Self {
            bind_address: bind_address.into(),
            store,
            cluster,
            credentials,
            registry: Arc::new(StatusRegistry::new()),
            cert_file: None,
            key_file: None,
            expvar: false,
            pprof: false,
            build_info: HashMap::new(),
            default_timeout: Duration::from_secs(10),
            handle: None,
            server_task: None,
            local_addr: None,
        }
    }

    /// Construct a service from a loaded [`GatewayConfig`].
    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<dyn Store>,
        cluster: Arc<dyn ClusterDirectory>,
        credentials: Option<Arc<dyn CredentialStore>>,
    ) -> Self {
        let mut service = Self::new(config.bind_address.clone(), store, cluster, credentials);
        service.cert_file = config.cert_file.clone();
        service.key_file = config.key_file.clone();
        service.expvar = config.expvar;
        service.pprof = config.pprof;
        service.default_timeout = config.default_timeout;
        service
    }

    /// Register a status source under a unique key. Fails on a duplicate
    /// key without mutating the existing registration.
    pub fn register_status(&self, key: &str, statuser: Arc<dyn Statuser>) -> Result<(), StatusError> {
        self.registry.register(key, statuser)
    }

    /// Bind the listener and start serving. Supports port 0; the actual
    /// address is available from [`Service::local_addr`] afterwards.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        if self.handle.is_some() {
            return Err(ServiceError::AlreadyStarted);
        }

        let addr: SocketAddr = self
            .bind_address
            .parse()
            .map_err(|e| ServiceError::InvalidBindAddress(self.bind_address.clone(), e))?;

        let state = Arc::new(AppState {
            store: Arc::clone(&self.store),
            cluster: Arc::clone(&self.cluster),
            credentials: self.credentials.clone(),
            registry: Arc::clone(&self.registry),
            build_info: self.build_info.clone(),
            bind_address: self.bind_address.clone(),
            default_timeout: self.default_timeout,
            expvar: self.expvar,
            pprof: self.pprof,
            start_time: Instant::now(),
        });
        let router = api::create_router(state);
        let handle = Handle::new();

        let tls = self.cert_file.is_some() && self.key_file.is_some();
        let server_task = if tls {
            // Both paths checked by the is_some() guard above.
            let cert = self.cert_file.clone().unwrap_or_default();
            let key = self.key_file.clone().unwrap_or_default();
            let tls_config = RustlsConfig::from_pem_file(cert, key)
                .await
                .map_err(ServiceError::Tls)?;
            let server = axum_server::bind_rustls(addr, tls_config).handle(handle.clone());
            tokio::spawn(async move {
                if let Err(e) = server.serve(router.into_make_service()).await {
                    tracing::error!(error = %e, "HTTPS server exited with error");
                }
            })
        } else {
            let server = axum_server::bind(addr).handle(handle.clone());
            tokio::spawn(async move {
                if let Err(e) = server.serve(router.into_make_service()).await {
                    tracing::error!(error = %e, "HTTP server exited with error");
                }
            })
        };

        let local_addr = match handle.listening().await {
            Some(a) => a,
            None => {
                server_task.abort();
                return Err(ServiceError::BindFailed(self.bind_address.clone()));
            }
        };
        tracing::info!(addr = %local_addr, tls, "gateway listening");

        self.handle = Some(handle);
        self.server_task = Some(server_task);
        self.local_addr = Some(local_addr);
        Ok(())
    }

    /// The address the listener is actually bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Release the listener and stop serving.
    pub async fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.shutdown();
        }
        if let Some(task) = self.server_task.take() {
            let _ = task.await;
        }
        self.local_addr = None;
        tracing::info!("gateway closed");
    }
}
