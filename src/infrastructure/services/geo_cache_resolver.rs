//! Cache-aside lookup of nearby restaurants keyed by geohash cell

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::domain::cache::{validate_precision, Cache, CacheExt, SpatialKey, DEFAULT_GEOHASH_PRECISION};
use crate::domain::discovery::ProximityQuery;
use crate::domain::restaurant::{Restaurant, RestaurantRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_cache_lookup, CacheLookup};

/// Configuration for the spatial cache
#[derive(Debug, Clone)]
pub struct GeoCacheConfig {
    /// Geohash length of the cache key
    pub precision: usize,
    /// Prefix of every cache key
    pub namespace: String,
    pub ttl: Duration,
}

impl Default for GeoCacheConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_GEOHASH_PRECISION,
            namespace: "restaurants".to_string(),
            ttl: Duration::from_secs(3600),
        }
    }
}

impl GeoCacheConfig {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Answers nearby lookups from the cache, computing and storing on miss.
///
/// Hits are returned as stored: the result was computed for the first point
/// that missed in the cell, at the time it missed. Callers at the other end of
/// a cell may see restaurants slightly outside their own radius, and results
/// can be up to one TTL old.
#[derive(Debug, Clone)]
pub struct GeoCacheResolver {
    cache: Arc<dyn Cache>,
    repository: Arc<dyn RestaurantRepository>,
    config: GeoCacheConfig,
}

impl GeoCacheResolver {
    pub fn new(
        cache: Arc<dyn Cache>,
        repository: Arc<dyn RestaurantRepository>,
        config: GeoCacheConfig,
    ) -> Result<Self, DomainError> {
        validate_precision(config.precision)?;

        Ok(Self {
            cache,
            repository,
            config,
        })
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Cache key for the cell containing the given point
    pub fn key_for(&self, latitude: f64, longitude: f64) -> Result<String, DomainError> {
        let key = SpatialKey::encode(latitude, longitude, self.config.precision)?;
        Ok(key.namespaced(&self.config.namespace))
    }

    /// Nearby open restaurants, served from the cell's cache entry when present
    pub async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
        radius_km: f64,
    ) -> Result<Vec<Restaurant>, DomainError> {
        let key = self.key_for(latitude, longitude)?;

        match self.cache.get::<Vec<Restaurant>>(&key).await {
            Ok(Some(restaurants)) => {
                debug!(key = %key, count = restaurants.len(), "Spatial cache hit");
                record_cache_lookup(CacheLookup::Hit);
                return Ok(restaurants);
            }
            Ok(None) => {
                debug!(key = %key, "Spatial cache miss");
                record_cache_lookup(CacheLookup::Miss);
            }
            Err(e) if e.is_cache_error() => {
                warn!(key = %key, error = %e, "Spatial cache read failed, using store");
                record_cache_lookup(CacheLookup::Error);
                return self.compute(latitude, longitude, time, radius_km).await;
            }
            Err(e) => return Err(e),
        }

        let restaurants = self.compute(latitude, longitude, time, radius_km).await?;

        if let Err(e) = self.cache.set(&key, &restaurants, self.config.ttl).await {
            warn!(key = %key, error = %e, "Failed to populate spatial cache");
        }

        Ok(restaurants)
    }

    /// Authoritative scan of the store, bypassing the cache
    pub async fn compute(
        &self,
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
        radius_km: f64,
    ) -> Result<Vec<Restaurant>, DomainError> {
        let all = self.repository.find_all().await?;
        Ok(ProximityQuery::new(latitude, longitude, time, radius_km).retain(all))
    }

    /// Drops the cached entry for the cell containing the given point
    pub async fn invalidate(&self, latitude: f64, longitude: f64) -> Result<bool, DomainError> {
        let key = self.key_for(latitude, longitude)?;
        self.cache.delete(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::restaurant::{time_of_day, MockRestaurantRepository, Query, RestaurantId};
    use crate::infrastructure::cache::InMemoryCache;

    fn restaurant(id: &str, latitude: f64, longitude: f64) -> Restaurant {
        Restaurant::new(
            RestaurantId::new(id).unwrap(),
            format!("Restaurant {}", id),
            latitude,
            longitude,
            time_of_day::parse("08:00").unwrap(),
            time_of_day::parse("23:00").unwrap(),
        )
    }

    fn noon() -> NaiveTime {
        time_of_day::parse("12:00:00").unwrap()
    }

    fn repository() -> Arc<MockRestaurantRepository> {
        Arc::new(MockRestaurantRepository::new().with_restaurants(vec![
            restaurant("near", 12.9716, 77.5946),
            restaurant("far", 13.5, 78.5),
            restaurant("also-near", 12.9750, 77.5990),
        ]))
    }

    fn ids(restaurants: &[Restaurant]) -> Vec<&str> {
        restaurants.iter().map(|r| r.id().as_str()).collect()
    }

    #[tokio::test]
    async fn test_miss_computes_and_populates() {
        let cache = Arc::new(InMemoryCache::new());
        let repo = repository();
        let resolver =
            GeoCacheResolver::new(cache.clone(), repo.clone(), GeoCacheConfig::default()).unwrap();

        let found = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();

        assert_eq!(ids(&found), vec!["near", "also-near"]);
        assert_eq!(cache.size().await.unwrap(), 1);
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test]
    async fn test_read_after_write_serves_same_cell_from_cache() {
        let cache = Arc::new(InMemoryCache::new());
        let repo = repository();
        let resolver =
            GeoCacheResolver::new(cache, repo.clone(), GeoCacheConfig::default()).unwrap();

        let first = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();
        // Same precision-7 cell, different time: served as stored
        let second = resolver
            .lookup(12.9717, 77.5947, time_of_day::parse("23:30").unwrap(), 5.0)
            .await
            .unwrap();

        // Restaurant equality is by id; compare every field
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test]
    async fn test_cached_coordinates_are_bit_exact() {
        // Needs more than 15 significant digits to round-trip
        let latitude = 12.971_600_000_000_123;
        let longitude = 77.594_600_000_000_456;
        let repo = Arc::new(
            MockRestaurantRepository::new()
                .with_restaurants(vec![restaurant("exact", latitude, longitude)]),
        );
        let resolver = GeoCacheResolver::new(
            Arc::new(InMemoryCache::new()),
            repo.clone(),
            GeoCacheConfig::default(),
        )
        .unwrap();

        resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();
        let cached = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();

        assert_eq!(repo.calls(), 1);
        assert_eq!(cached[0].latitude().to_bits(), latitude.to_bits());
        assert_eq!(cached[0].longitude().to_bits(), longitude.to_bits());
    }

    #[tokio::test]
    async fn test_failing_cache_falls_back_to_store() {
        let cache = Arc::new(MockCache::new().with_error("connection refused"));
        let resolver =
            GeoCacheResolver::new(cache.clone(), repository(), GeoCacheConfig::default()).unwrap();

        let found = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();
        let direct = resolver.compute(12.9716, 77.5946, noon(), 5.0).await.unwrap();

        assert_eq!(found, direct);
        assert_eq!(cache.set_calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_payload_falls_back_without_write_back() {
        let resolver_key = GeoCacheResolver::new(
            Arc::new(MockCache::new()),
            repository(),
            GeoCacheConfig::default(),
        )
        .unwrap()
        .key_for(12.9716, 77.5946)
        .unwrap();

        let cache = Arc::new(MockCache::new().with_raw_entry(&resolver_key, "{not json"));
        let resolver =
            GeoCacheResolver::new(cache.clone(), repository(), GeoCacheConfig::default()).unwrap();

        let found = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();

        assert_eq!(ids(&found), vec!["near", "also-near"]);
        assert_eq!(cache.set_calls(), 0);
        assert_eq!(cache.raw_entry(&resolver_key).as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_write_back_failure_still_returns_result() {
        let cache = Arc::new(MockCache::new().with_failing_writes());
        let resolver =
            GeoCacheResolver::new(cache.clone(), repository(), GeoCacheConfig::default()).unwrap();

        let found = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();

        assert_eq!(ids(&found), vec!["near", "also-near"]);
        assert_eq!(cache.set_calls(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let repo = Arc::new(MockRestaurantRepository::new().failing_on(Query::All));
        let resolver = GeoCacheResolver::new(
            Arc::new(InMemoryCache::new()),
            repo,
            GeoCacheConfig::default(),
        )
        .unwrap();

        let result = resolver.lookup(12.9716, 77.5946, noon(), 5.0).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let cache = Arc::new(InMemoryCache::new());
        let repo = repository();
        let resolver =
            GeoCacheResolver::new(cache, repo.clone(), GeoCacheConfig::default()).unwrap();

        resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();
        assert!(resolver.invalidate(12.9716, 77.5946).await.unwrap());
        resolver.lookup(12.9716, 77.5946, noon(), 5.0).await.unwrap();

        assert_eq!(repo.calls(), 2);
    }

    #[test]
    fn test_key_uses_namespace_and_precision() {
        let resolver = GeoCacheResolver::new(
            Arc::new(MockCache::new()),
            repository(),
            GeoCacheConfig::default().with_namespace("qeats").with_precision(5),
        )
        .unwrap();

        assert_eq!(resolver.key_for(42.6, -5.6).unwrap(), "qeats:ezs42");
    }

    #[test]
    fn test_rejects_invalid_precision() {
        let result = GeoCacheResolver::new(
            Arc::new(MockCache::new()),
            repository(),
            GeoCacheConfig::default().with_precision(0),
        );

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected() {
        let resolver = GeoCacheResolver::new(
            Arc::new(MockCache::new()),
            repository(),
            GeoCacheConfig::default(),
        )
        .unwrap();

        let result = resolver.lookup(91.0, 0.0, noon(), 5.0).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
