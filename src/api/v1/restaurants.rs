//! Restaurant discovery endpoint

use axum::{extract::State, Json};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, GetRestaurantsRequest, GetRestaurantsResponse, ValidatedQuery};

/// GET /qeats/v1/restaurants
pub async fn get_restaurants(
    State(state): State<AppState>,
    ValidatedQuery(request): ValidatedQuery<GetRestaurantsRequest>,
) -> Result<Json<GetRestaurantsResponse>, ApiError> {
    let now = state.clock.now();

    debug!(
        latitude = request.latitude,
        longitude = request.longitude,
        search_for = ?request.search_for,
        time = %now,
        "Listing restaurants"
    );

    let restaurants = state
        .discovery
        .find(
            request.latitude,
            request.longitude,
            now,
            request.search_for.as_deref(),
        )
        .await?;

    Ok(Json(GetRestaurantsResponse::new(restaurants)))
}
