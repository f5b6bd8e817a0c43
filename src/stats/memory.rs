//! In-process counter store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

use super::backend::{CounterBackend, StorageError, StorageType};

/// Counters kept in a process-local map.
///
/// Increment and read of a key happen under one write lock. Expiry is not
/// tracked and old buckets are never evicted.
#[derive(Debug, Default)]
pub struct MemoryCounters {
    counters: RwLock<HashMap<String, u64>>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, key: &str) -> u64 {
        let mut counters = self.counters.write();
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        *value
    }

    pub fn value(&self, key: &str) -> u64 {
        self.counters.read().get(key).copied().unwrap_or(0)
    }

    /// Number of buckets currently held.
    pub fn len(&self) -> usize {
        self.counters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.read().is_empty()
    }
}

#[async_trait]
impl CounterBackend for MemoryCounters {
    async fn incr_with_expiry(&self, key: &str, _ttl: Duration) -> Result<u64, StorageError> {
        Ok(self.increment(key))
    }

    async fn get(&self, key: &str) -> Result<u64, StorageError> {
        Ok(self.value(key))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}
