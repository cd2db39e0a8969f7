//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, DiscoveryConfig, LogFormat, LoggingConfig, ServerConfig, StorageBackend,
    StorageConfig,
};
