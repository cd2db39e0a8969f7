//! QEats Discovery
//!
//! Finds restaurants that can serve a location right now:
//! - Nearby lookups through a geohash-keyed cache-aside layer (moka or Redis)
//! - Free-text search fanned out over name, cuisine and menu criteria
//! - Serving radius that shrinks during peak meal hours

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::config::{StorageBackend, StorageConfig};
use crate::domain::restaurant::RestaurantFixtures;
use crate::domain::{
    Cache, DomainError, InMemoryRestaurantRepository, RestaurantRepository, ServingRadiusPolicy,
};
use crate::infrastructure::cache::{CacheConfig, CacheFactory};
use crate::infrastructure::restaurant::PostgresRestaurantRepository;
use crate::infrastructure::services::{
    DiscoveryService, GeoCacheConfig, GeoCacheResolver, SearchAggregator,
};
use crate::infrastructure::storage::{run_restaurant_migrations, PostgresConfig};

/// Sample restaurants served by the in-memory store when no fixtures file is configured
pub const SAMPLE_RESTAURANTS: &str = include_str!("../data/restaurants.json");

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = create_repository(&config.storage).await?;
    let cache = create_cache(&config.cache).await?;

    let radius_policy = ServingRadiusPolicy::new(
        config.discovery.peak_radius_km,
        config.discovery.normal_radius_km,
    );
    let aggregator = SearchAggregator::new(repository.clone(), Handle::current());
    let mut discovery = DiscoveryService::new(repository.clone(), aggregator, radius_policy);

    if let Some(cache) = &cache {
        let resolver_config = GeoCacheConfig::default()
            .with_precision(config.discovery.geohash_precision)
            .with_namespace(config.discovery.cache_namespace.clone())
            .with_ttl(config.cache.default_ttl());

        let resolver = GeoCacheResolver::new(cache.clone(), repository.clone(), resolver_config)?;
        discovery = discovery.with_resolver(resolver);
    }

    Ok(AppState::new(Arc::new(discovery), repository, cache))
}

async fn create_repository(config: &StorageConfig) -> anyhow::Result<Arc<dyn RestaurantRepository>> {
    info!("Storage backend: {:?}", config.backend);

    match config.backend {
        StorageBackend::InMemory => {
            let fixtures = match &config.fixtures_path {
                Some(path) => read_fixtures(path).await?,
                None => SAMPLE_RESTAURANTS.to_string(),
            };

            let repository = InMemoryRestaurantRepository::from_json(&fixtures)?;
            info!(restaurants = repository.len(), "In-memory restaurant store ready");

            Ok(Arc::new(repository))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .clone()
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
                })?;

            info!("Connecting to PostgreSQL...");
            let pool = PostgresConfig::new(url)
                .with_max_connections(config.max_connections)
                .connect()
                .await?;
            run_restaurant_migrations(&pool).await?;
            info!("PostgreSQL connection established");

            let repository = PostgresRestaurantRepository::new(pool);

            if let Some(path) = &config.fixtures_path {
                seed_postgres(&repository, &read_fixtures(path).await?).await?;
            }

            Ok(Arc::new(repository))
        }
    }
}

async fn read_fixtures(path: &str) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read restaurant fixtures from {}", path))
}

/// Upserts every fixture restaurant and menu into the database
async fn seed_postgres(repository: &PostgresRestaurantRepository, json: &str) -> anyhow::Result<()> {
    let fixtures: RestaurantFixtures =
        serde_json::from_str(json).context("Invalid restaurant fixtures")?;

    for restaurant in &fixtures.restaurants {
        repository.save(restaurant).await?;
    }
    for menu in &fixtures.menus {
        repository.save_menu(menu).await?;
    }

    info!(
        restaurants = fixtures.restaurants.len(),
        menus = fixtures.menus.len(),
        "Seeded PostgreSQL restaurant store"
    );
    Ok(())
}

/// Misconfiguration fails startup; an unreachable cache only disables caching
async fn create_cache(config: &CacheConfig) -> anyhow::Result<Option<Arc<dyn Cache>>> {
    match CacheFactory::new().create(config).await {
        Ok(cache) => {
            info!(backend = %config.backend, enabled = cache.is_some(), "Cache initialized");
            Ok(cache)
        }
        Err(e @ DomainError::Configuration { .. }) => Err(e.into()),
        Err(e) => {
            warn!(backend = %config.backend, error = %e, "Cache unavailable, serving from store only");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::restaurant::time_of_day;
    use crate::infrastructure::cache::CacheType;

    #[test]
    fn test_sample_restaurants_parse() {
        let repository = InMemoryRestaurantRepository::from_json(SAMPLE_RESTAURANTS).unwrap();
        assert!(!repository.is_empty());
    }

    #[tokio::test]
    async fn test_default_state_serves_sample_data() {
        let state = create_app_state().await.unwrap();
        assert!(state.cache.is_some());

        let found = state
            .discovery
            .find(12.9716, 77.5946, time_of_day::parse("11:00").unwrap(), None)
            .await
            .unwrap();
        assert_eq!(found[0].id().as_str(), "10");

        let biryani = state
            .discovery
            .find(12.9716, 77.5946, time_of_day::parse("16:00").unwrap(), Some("biryani"))
            .await
            .unwrap();
        assert_eq!(biryani[0].id().as_str(), "11");
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheType::None;

        let state = create_app_state_with_config(&config).await.unwrap();
        assert!(state.cache.is_none());
    }

    #[tokio::test]
    async fn test_redis_without_url_fails_startup() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheType::Redis;

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_fixtures_file_fails_startup() {
        let mut config = AppConfig::default();
        config.storage.fixtures_path = Some("does/not/exist.json".to_string());

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
