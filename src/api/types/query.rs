//! Query string extractor that validates and reports errors as JSON

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::error::ApiError;

/// Deserializes the query string into `T` and runs its validation rules.
///
/// Both malformed and out-of-range parameters are rejected with a 400
/// carrying the API error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T> ValidatedQuery<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::bad_request(rejection.body_text()).with_code("invalid_query")
            })?;

        value.validate().map_err(validation_error)?;

        Ok(Self(value))
    }
}

fn validation_error(errors: ValidationErrors) -> ApiError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<String> = field_errors.keys().map(|k| k.to_string()).collect();
    fields.sort();

    ApiError::bad_request(format!("Invalid query parameters: {}", fields.join(", ")))
        .with_param(fields.join(","))
        .with_code("validation_error")
}
