//! Pluggable status sources and the registry that aggregates them.
//!
//! Anything in the process can expose diagnostic data on `/status` by
//! registering a [`Statuser`] under a unique key. The registry is scoped to
//! a single `Service` instance so tests stay isolated.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::{json, Map, Value};
use thiserror::Error;

/// How long one status source may take before its entry is reported as an
/// error. One misbehaving source must not stall the whole response.
pub const STATUSER_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status key already registered: {0}")]
    DuplicateKey(String),
    #[error("status source failed: {0}")]
    Source(String),
}

/// A named source of diagnostic data.
pub trait Statuser: Send + Sync {
    /// Produce a serializable status snapshot.
    fn stats(&self) -> Result<Value, StatusError>;
}

/// Mutation-guarded mapping from key to status source.
///
/// Registration is rare and aggregation frequent; both are safe under
/// concurrent access.
#[derive(Default)]
pub struct StatusRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Statuser>>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a status source under a unique key.
    ///
    /// A key may be registered at most once; re-registration fails without
    /// mutating the existing entry. Conflicts are a programming-time error
    /// reported to the caller, never a request-time failure.
    pub fn register(&self, key: &str, statuser: Arc<dyn Statuser>) -> Result<(), StatusError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(key) {
            return Err(StatusError::DuplicateKey(key.to_string()));
        }
        entries.insert(key.to_string(), statuser);
        Ok(())
    }

    /// Collect every registered source's snapshot, keyed by registration
    /// key. A failing or slow source contributes an error marker for its
    /// key rather than failing the aggregation.
    pub async fn aggregate(&self) -> Map<String, Value> {
        self.aggregate_with_timeout(STATUSER_TIMEOUT).await
    }

    async fn aggregate_with_timeout(&self, per_source: Duration) -> Map<String, Value> {
        let snapshot: Vec<(String, Arc<dyn Statuser>)> = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            entries
                .iter()
                .map(|(k, v)| (k.clone(), Arc::clone(v)))
                .collect()
        };

        let mut out = Map::new();
        for (key, statuser) in snapshot {
            let stats =
                tokio::time::timeout(per_source, async move {
                    tokio::task::spawn_blocking(move || statuser.stats()).await
                })
                .await;

            let value = match stats {
                Ok(Ok(Ok(v))) => v,
                Ok(Ok(Err(e))) => json!({ "error": e.to_string() }),
                Ok(Err(e)) => json!({ "error": format!("status source panicked: {e}") }),
                Err(_) => json!({ "error": "status source timed out" }),
            };
            out.insert(key, value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStatuser(Value);

    impl Statuser for FixedStatuser {
        fn stats(&self) -> Result<Value, StatusError> {
            Ok(self.0.clone())
        }
    }

    struct FailingStatuser;

    impl Statuser for FailingStatuser {
        fn stats(&self) -> Result<Value, StatusError> {
            Err(StatusError::Source("boom".to_string()))
        }
    }

    #[test]
    fn test_register_duplicate_key() {
        let registry = StatusRegistry::new();
        let first: Arc<dyn Statuser> = Arc::new(FixedStatuser(json!({"n": 1})));
        let second: Arc<dyn Statuser> = Arc::new(FixedStatuser(json!({"n": 2})));

        registry.register("foo", first).unwrap();
        let err = registry.register("foo", second).unwrap_err();
        assert!(matches!(err, StatusError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_preserves_first_value() {
        let registry = StatusRegistry::new();
        registry
            .register("foo", Arc::new(FixedStatuser(json!({"n": 1}))))
            .unwrap();
        let _ = registry.register("foo", Arc::new(FixedStatuser(json!({"n": 2}))));

        let agg = registry.aggregate().await;
        assert_eq!(agg["foo"], json!({"n": 1}));
    }

    struct StallingStatuser;

    impl Statuser for StallingStatuser {
        fn stats(&self) -> Result<Value, StatusError> {
            std::thread::sleep(Duration::from_secs(1));
            Ok(json!({"late": true}))
        }
    }

    #[tokio::test]
    async fn test_aggregate_times_out_stalled_source() {
        let registry = StatusRegistry::new();
        registry
            .register("fast", Arc::new(FixedStatuser(json!({"ok": true}))))
            .unwrap();
        registry
            .register("slow", Arc::new(StallingStatuser))
            .unwrap();

        let agg = registry
            .aggregate_with_timeout(Duration::from_millis(50))
            .await;
        assert_eq!(agg["fast"], json!({"ok": true}));
        assert_eq!(agg["slow"]["error"], json!("status source timed out"));
    }

    #[tokio::test]
    async fn test_aggregate_includes_error_marker() {
        let registry = StatusRegistry::new();
        registry
            .register("good", Arc::new(FixedStatuser(json!({"ok": true}))))
            .unwrap();
        registry.register("bad", Arc::new(FailingStatuser)).unwrap();

        let agg = registry.aggregate().await;
        assert_eq!(agg["good"], json!({"ok": true}));
        assert_eq!(agg["bad"]["error"], json!("status source failed: boom"));
    }
}
