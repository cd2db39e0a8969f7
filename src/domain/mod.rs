//! Domain layer - Core business logic and entities

pub mod cache;
pub mod discovery;
pub mod error;
pub mod restaurant;

pub use cache::{Cache, CacheExt, SpatialKey};
pub use discovery::{ProximityQuery, SearchCriterion, ServingRadiusPolicy};
pub use error::DomainError;
pub use restaurant::{
    InMemoryRestaurantRepository, Menu, MenuItem, Restaurant, RestaurantId, RestaurantRepository,
};
