//! Storage infrastructure - PostgreSQL pool and schema

pub mod migrations;
mod postgres;

pub use migrations::{run_restaurant_migrations, Migration, PostgresMigrator, RESTAURANT_MIGRATIONS};
pub use postgres::PostgresConfig;
