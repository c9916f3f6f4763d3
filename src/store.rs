//! The consensus-backed SQL store the gateway fronts.
//!
//! The store itself (log replication, leader election, SQL execution) lives
//! elsewhere; the gateway consumes it through the [`Store`] trait and only
//! reasons about its leadership signals.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The operation requires leadership and this node is not the leader.
    #[error("not leader")]
    NotLeader,
    #[error("store error: {0}")]
    Other(String),
}

/// Tag selecting the on-wire representation of a backup artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackupFormat {
    /// Native binary snapshot. The default.
    #[default]
    Binary,
    /// Portable SQL text dump.
    Sql,
}

impl BackupFormat {
    /// Map the `fmt` query parameter to a format. Unrecognized values fall
    /// back to the native format.
    pub fn from_param(value: &str) -> Self {
        match value {
            "sql" => BackupFormat::Sql,
            _ => BackupFormat::Binary,
        }
    }
}

/// Byte stream produced by [`Store::backup`]. Dropping the stream cancels
/// the backup; an `Err` item aborts the in-flight response.
pub type BackupStream = BoxStream<'static, Result<Bytes, StoreError>>;

/// A set of write statements to apply through the consensus log.
#[derive(Debug, Clone, Default)]
pub struct ExecuteRequest {
    pub statements: Vec<String>,
    pub transaction: bool,
    pub timeout: Duration,
}

/// A read request with its consistency flags.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub statements: Vec<String>,
    pub transaction: bool,
    /// Serve the read from the leader.
    pub leader: bool,
    /// Verify leadership through consensus before reading.
    pub verify: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_insert_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRows {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A cluster member as reported by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub addr: String,
}

/// Capability set the gateway requires of the replicated store.
///
/// All methods are safe for concurrent calls from simultaneous requests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Apply write statements, transactionally or not.
    async fn execute(&self, req: ExecuteRequest) -> Result<Vec<ExecuteResult>, StoreError>;

    /// Run read queries with the given consistency flags.
    async fn query(&self, req: QueryRequest) -> Result<Vec<QueryRows>, StoreError>;

    /// Add a node to the cluster.
    async fn join(&self, id: &str, addr: &str, voter: bool) -> Result<(), StoreError>;

    /// Remove a node from the cluster.
    async fn remove(&self, id: &str) -> Result<(), StoreError>;

    /// The internal (consensus) address of the current leader. Empty when
    /// no leader is known.
    async fn leader_addr(&self) -> Result<String, StoreError>;

    /// Internal statistics for the introspection endpoint.
    async fn stats(&self) -> Result<serde_json::Value, StoreError>;

    /// List cluster members.
    async fn nodes(&self) -> Result<Vec<Server>, StoreError>;

    /// Produce a backup stream in the given format. When `leader` is true
    /// the data must come from the leader, and the store signals
    /// [`StoreError::NotLeader`] if this node cannot satisfy that.
    async fn backup(&self, leader: bool, format: BackupFormat)
        -> Result<BackupStream, StoreError>;

    /// Apply a restore payload.
    async fn load(&self, data: Bytes) -> Result<(), StoreError>;
}
