//! Selects the cache transport from configuration

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Cache transport behind the spatial resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Every lookup goes to the store
    #[serde(alias = "disabled", alias = "off")]
    None,
    /// Per-process moka cache
    #[default]
    #[serde(alias = "memory")]
    InMemory,
    /// Shared across instances
    Redis,
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheType::None => "none",
            CacheType::InMemory => "in_memory",
            CacheType::Redis => "redis",
        })
    }
}

/// `[cache]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheType,
    /// Required when `backend = "redis"`
    pub redis_url: Option<String>,
    /// Redis only
    pub key_prefix: Option<String>,
    /// Lifetime of a cached cell
    pub default_ttl_secs: u64,
    /// In-memory only
    pub max_capacity: u64,
    /// Redis connect and response timeout
    pub timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            default_ttl_secs: 3600,
            max_capacity: 10_000,
            timeout_ms: 2000,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            backend: CacheType::None,
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    fn redis(&self) -> Result<RedisCacheConfig, DomainError> {
        let url = self
            .redis_url
            .as_deref()
            .ok_or_else(|| DomainError::configuration("cache.redis_url is required for the redis backend"))?;

        let config = RedisCacheConfig::new(url).with_connection_timeout(Duration::from_millis(self.timeout_ms));

        Ok(match &self.key_prefix {
            Some(prefix) => config.with_key_prefix(prefix.as_str()),
            None => config,
        })
    }
}

/// Builds the configured cache
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// `Ok(None)` when caching is switched off.
    ///
    /// A missing Redis URL is a configuration error; an unreachable Redis is a
    /// cache error, which callers may downgrade to running without a cache.
    pub async fn create(&self, config: &CacheConfig) -> Result<Option<Arc<dyn Cache>>, DomainError> {
        let cache: Arc<dyn Cache> = match config.backend {
            CacheType::None => return Ok(None),
            CacheType::InMemory => Arc::new(InMemoryCache::with_config(
                InMemoryCacheConfig::default()
                    .with_default_ttl(config.default_ttl())
                    .with_max_capacity(config.max_capacity),
            )),
            CacheType::Redis => Arc::new(RedisCache::new(config.redis()?).await?),
        };

        Ok(Some(cache))
    }
}
