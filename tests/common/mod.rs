//! Shared mocks and helpers for the end-to-end tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde_json::json;

use quorum_gateway::auth::CredentialStore;
use quorum_gateway::cluster::{ClusterDirectory, ClusterError};
use quorum_gateway::store::{
    BackupFormat, BackupStream, ExecuteRequest, ExecuteResult, QueryRequest, QueryRows, Server,
    Store, StoreError,
};
use quorum_gateway::Service;

type BackupFn = dyn Fn(bool, BackupFormat) -> Result<Vec<u8>, StoreError> + Send + Sync;

/// Programmable store double. Defaults answer every call successfully with
/// empty results.
#[derive(Default)]
pub struct MockStore {
    /// Internal address of the leader, as `leader_addr` reports it. Empty
    /// means no leader is known.
    pub leader_addr: String,
    /// When set, every leader-sensitive operation reports not-leader.
    pub not_leader: bool,
    /// Custom backup behavior; `None` produces an empty successful stream.
    pub backup_fn: Option<Box<BackupFn>>,
    /// Exact chunk sequence for the backup stream, including mid-stream
    /// errors. Takes precedence over `backup_fn`.
    pub backup_chunks: Option<Vec<Result<Bytes, StoreError>>>,
    /// Cluster membership for `nodes`.
    pub members: Vec<Server>,
}

#[async_trait]
impl Store for MockStore {
    async fn execute(&self, req: ExecuteRequest) -> Result<Vec<ExecuteResult>, StoreError> {
        if self.not_leader {
            return Err(StoreError::NotLeader);
        }
        Ok(req
            .statements
            .iter()
            .map(|_| ExecuteResult {
                rows_affected: Some(1),
                ..Default::default()
            })
            .collect())
    }

    async fn query(&self, req: QueryRequest) -> Result<Vec<QueryRows>, StoreError> {
        if self.not_leader && req.leader {
            return Err(StoreError::NotLeader);
        }
        Ok(req
            .statements
            .iter()
            .map(|_| QueryRows {
                columns: vec!["id".to_string()],
                types: vec!["integer".to_string()],
                values: vec![vec![json!(1)]],
                ..Default::default()
            })
            .collect())
    }

    async fn join(&self, _id: &str, _addr: &str, _voter: bool) -> Result<(), StoreError> {
        if self.not_leader {
            return Err(StoreError::NotLeader);
        }
        Ok(())
    }

    async fn remove(&self, _id: &str) -> Result<(), StoreError> {
        if self.not_leader {
            return Err(StoreError::NotLeader);
        }
        Ok(())
    }

    async fn leader_addr(&self) -> Result<String, StoreError> {
        Ok(self.leader_addr.clone())
    }

    async fn stats(&self) -> Result<serde_json::Value, StoreError> {
        Ok(json!({ "leader": self.leader_addr }))
    }

    async fn nodes(&self) -> Result<Vec<Server>, StoreError> {
        Ok(self.members.clone())
    }

    async fn backup(
        &self,
        leader: bool,
        format: BackupFormat,
    ) -> Result<BackupStream, StoreError> {
        if let Some(chunks) = &self.backup_chunks {
            // Yield between chunks like a real asynchronous store would, so
            // the server flushes earlier chunks before seeing a later error.
            return Ok(Box::pin(stream::iter(chunks.clone()).then(|c| async {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                c
            })));
        }
        let bytes = match &self.backup_fn {
            Some(f) => f(leader, format)?,
            None => Vec::new(),
        };
        let chunks: Vec<Result<Bytes, StoreError>> = vec![Ok(Bytes::from(bytes))];
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn load(&self, _data: Bytes) -> Result<(), StoreError> {
        if self.not_leader {
            return Err(StoreError::NotLeader);
        }
        Ok(())
    }
}

/// Cluster directory double resolving every node to one fixed API address.
#[derive(Default)]
pub struct MockCluster {
    /// API address returned for every node; empty means resolution fails.
    pub api_addr: String,
}

#[async_trait]
impl ClusterDirectory for MockCluster {
    async fn node_api_addr(&self, node_addr: &str) -> Result<String, ClusterError> {
        if self.api_addr.is_empty() {
            return Err(ClusterError::NoApiAddr(node_addr.to_string()));
        }
        Ok(self.api_addr.clone())
    }

    async fn stats(&self) -> Result<serde_json::Value, ClusterError> {
        Ok(json!({ "api_addr": self.api_addr }))
    }
}

/// Credential store double with fixed answers.
pub struct MockCredentials {
    pub check_ok: bool,
    pub has_perm_ok: bool,
}

impl CredentialStore for MockCredentials {
    fn check(&self, _username: &str, _password: &str) -> bool {
        self.check_ok
    }

    fn has_perm(&self, _username: &str, _perm: &str) -> bool {
        self.has_perm_ok
    }
}

/// Start a gateway on an ephemeral port. The returned `Service` must be
/// kept alive (and closed) by the caller; the `String` is the plain-HTTP
/// base URL.
pub async fn start_service(mut service: Service) -> (Service, String) {
    service.start().await.expect("failed to start service");
    let addr = service.local_addr().expect("service has no local address");
    let host = format!("http://{addr}");
    (service, host)
}

/// A `Service` with the given collaborators, bound to an ephemeral port but
/// not yet started.
pub fn service_with(
    store: MockStore,
    cluster: MockCluster,
    credentials: Option<MockCredentials>,
) -> Service {
    Service::new(
        "127.0.0.1:0",
        Arc::new(store),
        Arc::new(cluster),
        credentials.map(|c| Arc::new(c) as Arc<dyn CredentialStore>),
    )
}

/// HTTP client that never follows redirects, so 301s can be asserted.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .expect("failed to build test client")
}
