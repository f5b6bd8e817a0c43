//! Page view counter store with remote/in-process backend selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, trace, warn};

use super::backend::{CounterBackend, StorageError, StorageType};
use super::memory::MemoryCounters;
use super::remote::RedisCounters;
use super::window::BucketKeys;
use crate::config::StorageConfig;

/// Counts for the current hour, day and week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub last_hour: u64,
    pub last_day: u64,
    pub last_week: u64,
    /// Storage path that served this read
    pub storage_type: StorageType,
}

/// Records page views into hour/day/week buckets.
///
/// The remote backend is chosen on first use: if Redis answers the probe
/// it serves every later call, otherwise the in-process counters do for
/// the lifetime of the store. Remote failures after selection fall back
/// to the in-process counters for that call only. No operation returns an
/// error to its caller.
///
/// Selection (connect plus `PING`) and each later remote command are bounded
/// by `storage.redis_timeout_ms` separately. A first call against a stalled
/// server therefore waits up to twice that timeout before falling back.
pub struct CounterStore {
    redis_url: String,
    timeout: Duration,
    key_prefix: String,
    /// `None` once selection decided on the in-process counters
    remote: OnceCell<Option<Arc<dyn CounterBackend>>>,
    memory: MemoryCounters,
}

impl CounterStore {
    /// Create a store that probes Redis lazily on first use.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            timeout: config.redis_timeout(),
            key_prefix: config.key_prefix.clone(),
            remote: OnceCell::new(),
            memory: MemoryCounters::new(),
        }
    }

    /// Create a store with the remote backend already selected.
    pub fn with_remote(key_prefix: impl Into<String>, remote: Arc<dyn CounterBackend>) -> Self {
        Self::preselected(key_prefix.into(), Some(remote))
    }

    /// Create a store that only uses the in-process counters.
    pub fn in_memory(key_prefix: impl Into<String>) -> Self {
        Self::preselected(key_prefix.into(), None)
    }

    fn preselected(key_prefix: String, remote: Option<Arc<dyn CounterBackend>>) -> Self {
        Self {
            redis_url: String::new(),
            timeout: Duration::ZERO,
            key_prefix,
            remote: OnceCell::new_with(Some(remote)),
            memory: MemoryCounters::new(),
        }
    }

    /// In-process counters, used directly or as fallback.
    pub fn memory(&self) -> &MemoryCounters {
        &self.memory
    }

    /// Record one page view at the current time.
    pub async fn record_event(&self) {
        self.record_event_at(Utc::now()).await
    }

    /// Record one page view at `now`.
    pub async fn record_event_at(&self, now: DateTime<Utc>) {
        let keys = BucketKeys::at(&self.key_prefix, now);

        if let Some(remote) = self.remote().await {
            match record_remote(remote.as_ref(), &keys).await {
                Ok(()) => return,
                Err(e) => {
                    warn!(error = %e, key = %keys.hour, "Remote write failed, recording in memory");
                }
            }
        }

        for (_, key) in keys.iter() {
            self.memory.increment(key);
        }
        trace!(key = %keys.hour, "Recorded event in memory");
    }

    /// Counts for the buckets containing the current time.
    pub async fn get_counts(&self) -> StatsSnapshot {
        self.get_counts_at(Utc::now()).await
    }

    /// Counts for the buckets containing `now`. Absent buckets read as zero.
    pub async fn get_counts_at(&self, now: DateTime<Utc>) -> StatsSnapshot {
        let keys = BucketKeys::at(&self.key_prefix, now);

        if let Some(remote) = self.remote().await {
            match read_remote(remote.as_ref(), &keys).await {
                Ok((last_hour, last_day, last_week)) => {
                    return StatsSnapshot {
                        last_hour,
                        last_day,
                        last_week,
                        storage_type: remote.storage_type(),
                    };
                }
                Err(e) => {
                    warn!(error = %e, "Remote read failed, reading counts from memory");
                    return self.read_memory(&keys, StorageType::MemoryFallback);
                }
            }
        }

        self.read_memory(&keys, StorageType::Memory)
    }

    /// Storage path selected for this store, probing if not yet decided.
    pub async fn storage_type(&self) -> StorageType {
        match self.remote().await {
            Some(remote) => remote.storage_type(),
            None => StorageType::Memory,
        }
    }

    async fn remote(&self) -> Option<&Arc<dyn CounterBackend>> {
        self.remote
            .get_or_init(|| self.select_backend())
            .await
            .as_ref()
    }

    async fn select_backend(&self) -> Option<Arc<dyn CounterBackend>> {
        debug!(timeout_ms = self.timeout.as_millis() as u64, "Probing Redis");

        match RedisCounters::connect(&self.redis_url, self.timeout).await {
            Ok(counters) => {
                info!("Using Redis for page view counters");
                Some(Arc::new(counters))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Redis unavailable, using in-memory counters until restart"
                );
                None
            }
        }
    }

    fn read_memory(&self, keys: &BucketKeys, storage_type: StorageType) -> StatsSnapshot {
        StatsSnapshot {
            last_hour: self.memory.value(&keys.hour),
            last_day: self.memory.value(&keys.day),
            last_week: self.memory.value(&keys.week),
            storage_type,
        }
    }
}

async fn record_remote(remote: &dyn CounterBackend, keys: &BucketKeys) -> Result<(), StorageError> {
    for (window, key) in keys.iter() {
        remote.incr_with_expiry(key, window.ttl()).await?;
    }
    Ok(())
}

async fn read_remote(
    remote: &dyn CounterBackend,
    keys: &BucketKeys,
) -> Result<(u64, u64, u64), StorageError> {
    Ok((
        remote.get(&keys.hour).await?,
        remote.get(&keys.day).await?,
        remote.get(&keys.week).await?,
    ))
}
