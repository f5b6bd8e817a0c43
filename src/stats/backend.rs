//! Storage trait for abstracting remote and in-process counter stores.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a counter backend.
///
/// These never leave the [`CounterStore`](super::CounterStore); it turns
/// them into a fallback write or a fallback read.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// The storage path that served a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Shared remote store
    Redis,
    /// In-process counters, remote store never selected
    Memory,
    /// In-process counters after the remote store failed this call
    MemoryFallback,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Redis => "redis",
            StorageType::Memory => "memory",
            StorageType::MemoryFallback => "memory_fallback",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for counter storage implementations.
///
/// Implementations must be safe to share across concurrently running
/// request handlers.
#[async_trait]
pub trait CounterBackend: Send + Sync {
    /// Increment `key` by one, set its expiry to `ttl`, and return the new value.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64, StorageError>;

    /// Read the value of `key`, treating an absent key as zero.
    async fn get(&self, key: &str) -> Result<u64, StorageError>;

    /// Which storage path this backend represents.
    fn storage_type(&self) -> StorageType;
}
