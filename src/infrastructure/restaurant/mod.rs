//! Restaurant infrastructure - PostgreSQL-backed store

mod postgres_repository;

pub use postgres_repository::PostgresRestaurantRepository;
