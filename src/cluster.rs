//! Cluster directory: resolves node identities to reachable API addresses.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("no API address for node {0}")]
    NoApiAddr(String),
    #[error("cluster directory error: {0}")]
    Other(String),
}

/// Resolves a node's internal (consensus) address to the API address clients
/// can actually reach, and reports its own statistics.
#[async_trait]
pub trait ClusterDirectory: Send + Sync {
    /// The externally reachable API address of the node at `node_addr`.
    async fn node_api_addr(&self, node_addr: &str) -> Result<String, ClusterError>;

    /// Directory statistics for the introspection endpoint.
    async fn stats(&self) -> Result<serde_json::Value, ClusterError>;
}
