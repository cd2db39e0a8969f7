//! Infrastructure services

mod discovery_service;
mod geo_cache_resolver;
mod search_aggregator;

pub use discovery_service::DiscoveryService;
pub use geo_cache_resolver::{GeoCacheConfig, GeoCacheResolver};
pub use search_aggregator::SearchAggregator;
