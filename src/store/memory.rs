use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{DocumentStore, StoreError};

/// One call made against a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Set(String),
    Delete(String),
}

/// In-process collection. Keeps ids sorted the way the remote store lists them and
/// records every call so tests can assert on the exact mutations issued.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: Mutex<BTreeSet<String>>,
    ops: Mutex<Vec<StoreOp>>,
    failing_deletes: Mutex<HashSet<String>>,
    failing_sets: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn ids(&self) -> Vec<String> {
        lock(&self.ids).iter().cloned().collect()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        lock(&self.ops).clone()
    }

    pub fn clear_ops(&self) {
        lock(&self.ops).clear();
    }

    /// Makes every later delete of `id` fail.
    pub fn fail_deletes_of(&self, id: &str) {
        lock(&self.failing_deletes).insert(id.to_string());
    }

    /// Makes every later write of `id` fail.
    pub fn fail_sets_of(&self, id: &str) {
        lock(&self.failing_sets).insert(id.to_string());
    }

    fn record(&self, op: StoreOp) {
        lock(&self.ops).push(op);
    }
}

// A poisoned lock only means a test panicked mid-call; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn simulated_failure(operation: &'static str, id: &str) -> StoreError {
    StoreError::Rejected {
        operation,
        id: id.to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "simulated failure".to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        self.record(StoreOp::List);
        Ok(self.ids())
    }

    async fn set_empty(&self, id: &str) -> Result<(), StoreError> {
        self.record(StoreOp::Set(id.to_string()));
        if lock(&self.failing_sets).contains(id) {
            return Err(simulated_failure("set", id));
        }
        lock(&self.ids).insert(id.to_string());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record(StoreOp::Delete(id.to_string()));
        if lock(&self.failing_deletes).contains(id) {
            return Err(simulated_failure("delete", id));
        }
        lock(&self.ids).remove(id);
        Ok(())
    }
}
