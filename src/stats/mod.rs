//! Page view counting and bucketed statistics.

mod backend;
mod memory;
mod remote;
mod store;
#[cfg(test)]
mod test_servers;
mod window;

pub use backend::{CounterBackend, StorageError, StorageType};
pub use memory::MemoryCounters;
pub use remote::RedisCounters;
pub use store::{CounterStore, StatsSnapshot};
pub use window::{BucketKeys, StatsWindow};
