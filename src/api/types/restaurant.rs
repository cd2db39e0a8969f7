//! Restaurant listing request and response types

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::Restaurant;

/// Query of `GET /qeats/v1/restaurants`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetRestaurantsRequest {
    #[validate(range(min = -90.0, max = 90.0), custom(function = "finite"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0), custom(function = "finite"))]
    pub longitude: f64,
    /// Free-text search; absent means "everything nearby"
    #[serde(default)]
    pub search_for: Option<String>,
}

/// `range` lets NaN through, since every comparison with it is false
fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRestaurantsResponse {
    pub restaurants: Vec<Restaurant>,
}

impl GetRestaurantsResponse {
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }
}
