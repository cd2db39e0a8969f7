//! Cache domain - cache transport abstraction and spatial keys

mod key;
mod repository;

pub use key::{
    validate_precision, SpatialKey, DEFAULT_GEOHASH_PRECISION, MAX_GEOHASH_PRECISION,
};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
