//! Redis-backed counter store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::{CounterBackend, StorageError, StorageType};

/// Counters kept in Redis, one key per bucket.
///
/// The multiplexed connection is cloned per operation, so a single
/// instance serves all request handlers. Atomicity of `INCR` is left to
/// the server.
pub struct RedisCounters {
    connection: MultiplexedConnection,
    timeout: Duration,
}

impl RedisCounters {
    /// Connect to `url` and verify the server answers `PING`.
    ///
    /// Connect and `PING` together are bounded by one `timeout`, which is
    /// then applied to every later operation on its own.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StorageError> {
        let client = Client::open(url)?;

        let connection = bounded(timeout, async {
            let mut connection = client.get_multiplexed_tokio_connection().await?;
            let _pong: String = redis::cmd("PING").query_async(&mut connection).await?;
            Ok::<_, redis::RedisError>(connection)
        })
        .await?;

        info!(timeout_ms = timeout.as_millis() as u64, "Connected to Redis");
        Ok(Self {
            connection,
            timeout,
        })
    }
}

#[async_trait]
impl CounterBackend for RedisCounters {
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64, StorageError> {
        let mut connection = self.connection.clone();
        let mut pipe = redis::pipe();
        pipe.incr(key, 1u64)
            .expire(key, ttl.as_secs() as i64)
            .ignore();

        let (value,): (u64,) = bounded(self.timeout, pipe.query_async(&mut connection)).await?;

        debug!(key, value, ttl_secs = ttl.as_secs(), "Incremented Redis counter");
        Ok(value)
    }

    async fn get(&self, key: &str) -> Result<u64, StorageError> {
        let mut connection = self.connection.clone();
        let value: Option<u64> = bounded(self.timeout, connection.get(key)).await?;
        Ok(value.unwrap_or(0))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Redis
    }
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, StorageError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StorageError::Timeout(timeout)),
    }
}
