//! Shared cache on Redis, visible to every server instance

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, Cmd, FromRedisValue};
use tracing::debug;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

const SCAN_BATCH: usize = 200;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    pub url: String,
    /// Keys are stored as `<prefix>:<key>` when set
    pub key_prefix: Option<String>,
    /// Applied to connecting and to each response
    pub connection_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: None,
            connection_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis-backed cell store.
///
/// A single `ConnectionManager` is cloned per command; it multiplexes and
/// reconnects on its own, so a Redis restart only fails in-flight commands.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    prefix: Option<String>,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to Redis; fails if the server is unreachable at startup
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Invalid Redis URL: {}", e)))?;

        let conn = ConnectionManager::new_with_config(
            client,
            ConnectionManagerConfig::new()
                .set_connection_timeout(config.connection_timeout)
                .set_response_timeout(config.connection_timeout),
        )
        .await
        .map_err(|e| DomainError::cache(format!("Redis unreachable at {}: {}", config.url, e)))?;

        Ok(Self {
            conn,
            prefix: config.key_prefix,
        })
    }

    fn full_key(&self, key: &str) -> String {
        self.prefix
            .as_deref()
            .map_or_else(|| key.to_string(), |prefix| format!("{}:{}", prefix, key))
    }

    async fn run<T: FromRedisValue>(&self, cmd: &Cmd, action: &str) -> Result<T, DomainError> {
        let mut conn = self.conn.clone();
        cmd.query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis {} failed: {}", action, e)))
    }

    /// Every key under this cache's prefix
    async fn owned_keys(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let pattern = format!("{}:*", prefix);
        let mut keys = Vec::new();
        let mut cursor = 0u64;

        loop {
            let mut scan = redis::cmd("SCAN");
            scan.arg(cursor).arg("MATCH").arg(&pattern).arg("COUNT").arg(SCAN_BATCH);

            let (next, batch): (u64, Vec<String>) = self.run(&scan, "SCAN").await?;
            keys.extend(batch);

            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.run(redis::cmd("GET").arg(self.full_key(key)), "GET").await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        // EX takes whole seconds; zero would be rejected
        let seconds = ttl.as_secs().max(1);

        self.run(
            redis::cmd("SET").arg(self.full_key(key)).arg(value).arg("EX").arg(seconds),
            "SET",
        )
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let removed: u64 = self.run(redis::cmd("DEL").arg(self.full_key(key)), "DEL").await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let Some(prefix) = self.prefix.as_deref() else {
            return self.run(&redis::cmd("FLUSHDB"), "FLUSHDB").await;
        };

        for chunk in self.owned_keys(prefix).await?.chunks(SCAN_BATCH) {
            let _: u64 = self.run(redis::cmd("UNLINK").arg(chunk.to_vec()), "UNLINK").await?;
        }
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        match self.prefix.as_deref() {
            Some(prefix) => Ok(self.owned_keys(prefix).await?.len()),
            None => self.run(&redis::cmd("DBSIZE"), "DBSIZE").await,
        }
    }

    async fn is_available(&self) -> bool {
        let ping: Result<String, _> = self.run(&redis::cmd("PING"), "PING").await;
        if let Err(e) = &ping {
            debug!(error = %e, "Redis health check failed");
        }
        ping.is_ok()
    }
}
