use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;

use crate::domain::cache::DEFAULT_GEOHASH_PRECISION;
use crate::domain::discovery::{NORMAL_RADIUS_KM, PEAK_RADIUS_KM};
use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub observability: ObservabilityConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where restaurants are read from
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Falls back to `DATABASE_URL` when unset
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// JSON restaurants and menus; loaded into the in-memory store (built-in sample
    /// data when unset) or upserted into PostgreSQL at startup
    pub fixtures_path: Option<String>,
}

/// Knobs of the discovery flow
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Geohash length of the spatial cache key
    pub geohash_precision: usize,
    pub peak_radius_km: f64,
    pub normal_radius_km: f64,
    pub cache_namespace: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host` must be an IP literal; hostnames are not resolved
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("server.host '{}' is not an IP address: {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
            fixtures_path: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            geohash_precision: DEFAULT_GEOHASH_PRECISION,
            peak_radius_km: PEAK_RADIUS_KM,
            normal_radius_km: NORMAL_RADIUS_KM,
            cache_namespace: "restaurants".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.cache.backend, CacheType::InMemory);
        assert_eq!(config.storage.backend, StorageBackend::InMemory);
        assert_eq!(config.discovery.geohash_precision, 7);
        assert_eq!(config.discovery.peak_radius_km, 3.0);
        assert_eq!(config.discovery.normal_radius_km, 5.0);
        assert_eq!(config.discovery.cache_namespace, "restaurants");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "server": {"port": 9090},
                "logging": {"format": "json"},
                "cache": {"backend": "none"},
                "storage": {"backend": "postgres", "database_url": "postgres://db/qeats"},
                "discovery": {"geohash_precision": 6}
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.cache.backend, CacheType::None);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.max_connections, 10);
        assert_eq!(config.discovery.geohash_precision, 6);
        assert_eq!(config.discovery.normal_radius_km, 5.0);
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:9000");

        let named = ServerConfig {
            host: "localhost".to_string(),
            ..Default::default()
        };
        assert!(named.socket_addr().is_err());
    }
}
