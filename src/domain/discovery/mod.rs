//! Discovery domain - proximity predicate, serving radius and search criteria

mod criterion;
mod proximity;
mod radius;

pub use criterion::SearchCriterion;
pub use proximity::{
    distance_km, is_open_and_close, is_open_at, validate_coordinates, ProximityQuery,
    EARTH_RADIUS_KM,
};
pub use radius::{ServingRadiusPolicy, NORMAL_RADIUS_KM, PEAK_RADIUS_KM};
