//! Configuration management for Pagestats.
//!
//! Sources are layered in this order, later ones winning:
//! an optional config file, `PAGESTATS__<SECTION>__<FIELD>` environment
//! variables, then `REDIS_URL`.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Environment variable selecting the remote counter store.
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Main configuration for the Pagestats service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagestatsConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Counter storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Page served at `/`
    #[serde(default)]
    pub page: PageConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_request_timeout() -> u64 {
    30
}

/// Counter storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Redis connection string (`redis://` or `rediss://`)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Connect and response timeout for Redis, in milliseconds
    #[serde(default = "default_redis_timeout")]
    pub redis_timeout_ms: u64,

    /// Prefix prepended to every bucket key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            redis_timeout_ms: default_redis_timeout(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl StorageConfig {
    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_timeout() -> u64 {
    5000
}

fn default_key_prefix() -> String {
    "qr_count_".to_string()
}

/// Which single-page tool is served at `/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// QR code creator with style variants
    #[default]
    Qr,
    /// Random cat viewer
    Cat,
}

/// Page configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub kind: PageKind,
}

impl PagestatsConfig {
    /// Load configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: PagestatsConfig = builder
            .add_source(Environment::with_prefix("PAGESTATS").separator("__"))
            .set_override_option("storage.redis_url", std::env::var(REDIS_URL_ENV).ok())?
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}
