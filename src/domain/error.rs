use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// The authoritative restaurant store could not be queried
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// The cache transport is unreachable or rejected a command
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// A cached payload could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// One of the concurrent search branches failed
    #[error("Search aggregation failed in '{criterion}' branch: {message}")]
    Aggregation { criterion: String, message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn aggregation(criterion: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Aggregation {
            criterion: criterion.into(),
            message: message.into(),
        }
    }

    /// Whether the error belongs to the best-effort cache layer and may be
    /// recovered by falling back to the store
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Self::Cache { .. } | Self::Serialization { .. })
    }
}
