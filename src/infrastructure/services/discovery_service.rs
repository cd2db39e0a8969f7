//! Restaurant discovery orchestration

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveTime;
use tracing::{debug, error, info};

use crate::domain::discovery::{
    validate_coordinates, ProximityQuery, SearchCriterion, ServingRadiusPolicy,
};
use crate::domain::restaurant::{Restaurant, RestaurantRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_search;

use super::geo_cache_resolver::GeoCacheResolver;
use super::search_aggregator::SearchAggregator;

/// Entry point for "restaurants near me" and free-text searches
#[derive(Debug, Clone)]
pub struct DiscoveryService {
    repository: Arc<dyn RestaurantRepository>,
    resolver: Option<GeoCacheResolver>,
    aggregator: SearchAggregator,
    radius_policy: ServingRadiusPolicy,
}

impl DiscoveryService {
    pub fn new(
        repository: Arc<dyn RestaurantRepository>,
        aggregator: SearchAggregator,
        radius_policy: ServingRadiusPolicy,
    ) -> Self {
        Self {
            repository,
            resolver: None,
            aggregator,
            radius_policy,
        }
    }

    /// Serves nearby lookups through the spatial cache
    pub fn with_resolver(mut self, resolver: GeoCacheResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Searches when a query is given (an empty one yields nothing), else lists nearby
    pub async fn find(
        &self,
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
        query: Option<&str>,
    ) -> Result<Vec<Restaurant>, DomainError> {
        // Checked before the cached and direct paths split so both reject alike
        validate_coordinates(latitude, longitude)?;

        match query {
            Some(query) => self.find_by_search(latitude, longitude, time, query).await,
            None => self.find_nearby(latitude, longitude, time).await,
        }
    }

    /// Open restaurants within the serving radius for `time`
    pub async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
    ) -> Result<Vec<Restaurant>, DomainError> {
        let started = Instant::now();
        let radius_km = self.radius_policy.radius_for(time);

        let result = match &self.resolver {
            Some(resolver) if resolver.cache().is_available().await => {
                resolver.lookup(latitude, longitude, time, radius_km).await
            }
            _ => {
                debug!("Spatial cache unavailable, scanning store");
                self.compute_nearby(latitude, longitude, time, radius_km).await
            }
        };

        record_search("nearby", result.is_ok(), started.elapsed());

        match &result {
            Ok(restaurants) => info!(
                latitude,
                longitude,
                radius_km,
                count = restaurants.len(),
                "Nearby restaurants resolved"
            ),
            Err(e) => error!(latitude, longitude, error = %e, "Nearby lookup failed"),
        }

        result
    }

    /// Open restaurants within the serving radius matching a free-text query
    pub async fn find_by_search(
        &self,
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
        query: &str,
    ) -> Result<Vec<Restaurant>, DomainError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let radius_km = self.radius_policy.radius_for(time);

        let result = self
            .aggregator
            .search(
                &SearchCriterion::all_for(query),
                latitude,
                longitude,
                time,
                radius_km,
            )
            .await;

        record_search("search", result.is_ok(), started.elapsed());

        if let Ok(restaurants) = &result {
            info!(
                query = query.trim(),
                radius_km,
                count = restaurants.len(),
                "Restaurant search resolved"
            );
        }

        result
    }

    async fn compute_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        time: NaiveTime,
        radius_km: f64,
    ) -> Result<Vec<Restaurant>, DomainError> {
        match &self.resolver {
            Some(resolver) => resolver.compute(latitude, longitude, time, radius_km).await,
            None => {
                let all = self.repository.find_all().await?;
                Ok(ProximityQuery::new(latitude, longitude, time, radius_km).retain(all))
            }
        }
    }
}
