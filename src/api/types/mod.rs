//! HTTP request/response types

pub mod error;
pub mod query;
pub mod restaurant;

pub use error::{ApiError, ApiErrorBody, ApiErrorType};
pub use query::ValidatedQuery;
pub use restaurant::{GetRestaurantsRequest, GetRestaurantsResponse};
