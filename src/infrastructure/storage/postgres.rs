//! PostgreSQL pool for the restaurant store

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use crate::domain::DomainError;

/// Pool settings; one pool is shared by every request
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a request may wait for a free connection
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(self.min_connections);
        self
    }

    /// Opens the pool, failing fast when the database is unreachable
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        debug!(max_connections = self.max_connections, "Opening PostgreSQL pool");

        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Some(self.idle_timeout))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("PostgreSQL unreachable: {}", e)))
    }
}
