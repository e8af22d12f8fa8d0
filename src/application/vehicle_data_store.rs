// Vehicle data store - In-memory latest payload plus a capped rolling history
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::RwLock;

pub const HISTORY_CAPACITY: usize = 1000;
pub const SNAPSHOT_HISTORY: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    pub received_at: DateTime<Utc>,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDataSnapshot {
    pub latest: Option<Value>,
    pub history: Vec<StoredEntry>,
    pub total_count: usize,
}

#[derive(Default)]
struct Inner {
    latest: Option<Value>,
    history: VecDeque<StoredEntry>,
}

/// Not durable: everything is gone after a restart.
#[derive(Default)]
pub struct VehicleDataStore {
    inner: RwLock<Inner>,
}

impl VehicleDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the history length after the append
    pub async fn append(&self, payload: Value) -> usize {
        let mut inner = self.inner.write().await;
        inner.latest = Some(payload.clone());
        if inner.history.len() == HISTORY_CAPACITY {
            inner.history.pop_front();
        }
        inner.history.push_back(StoredEntry {
            received_at: Utc::now(),
            payload,
        });
        inner.history.len()
    }

    pub async fn snapshot(&self) -> VehicleDataSnapshot {
        let inner = self.inner.read().await;
        let skip = inner.history.len().saturating_sub(SNAPSHOT_HISTORY);
        VehicleDataSnapshot {
            latest: inner.latest.clone(),
            history: inner.history.iter().skip(skip).cloned().collect(),
            total_count: inner.history.len(),
        }
    }
}
