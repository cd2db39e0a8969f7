//! Public v1 API endpoints

pub mod restaurants;

use axum::{routing::get, Router};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new().route("/restaurants", get(restaurants::get_restaurants))
}
