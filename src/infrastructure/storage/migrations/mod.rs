//! Embedded schema migrations for the restaurant store

use std::collections::HashSet;

use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::domain::DomainError;

/// A versioned schema change
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

/// Restaurant store schema, in apply order
pub const RESTAURANT_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create restaurants table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS restaurants (
                seq BIGSERIAL UNIQUE,
                restaurant_id VARCHAR(64) PRIMARY KEY,
                name TEXT NOT NULL,
                city TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT '',
                latitude DOUBLE PRECISION NOT NULL,
                longitude DOUBLE PRECISION NOT NULL,
                opens_at VARCHAR(8) NOT NULL,
                closes_at VARCHAR(8) NOT NULL,
                attributes TEXT[] NOT NULL DEFAULT '{}'
            );
            CREATE INDEX IF NOT EXISTS idx_restaurants_name_lower ON restaurants (lower(name));
        "#,
    },
    Migration {
        version: 2,
        description: "Create menu_items table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS menu_items (
                restaurant_id VARCHAR(64) NOT NULL REFERENCES restaurants(restaurant_id) ON DELETE CASCADE,
                item_id VARCHAR(64) NOT NULL,
                name TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL DEFAULT 0,
                attributes TEXT[] NOT NULL DEFAULT '{}',
                PRIMARY KEY (restaurant_id, item_id)
            );
        "#,
    },
];

fn storage_error(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::storage(format!("{}: {}", context, e))
}

/// Applies migrations not yet recorded in `_migrations`.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row, so a failed migration leaves no partial schema behind.
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn applied_versions(&self) -> Result<HashSet<i64>, DomainError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error("Failed to create migrations table"))?;

        let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM _migrations")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to read applied migrations"))?;

        Ok(versions.into_iter().collect())
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("Failed to open migration transaction"))?;

        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Migration {} failed: {}", migration.version, e))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("Failed to record migration"))?;

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit migration"))?;

        info!(version = migration.version, description = migration.description, "Applied migration");
        Ok(())
    }

    /// Runs every pending migration in version order; returns how many ran
    pub async fn migrate(&self, migrations: &[Migration]) -> Result<usize, DomainError> {
        let applied = self.applied_versions().await?;
        let mut ran = 0;

        for migration in pending(migrations, &applied) {
            self.apply(migration).await?;
            ran += 1;
        }

        Ok(ran)
    }
}

fn pending<'a>(migrations: &'a [Migration], applied: &HashSet<i64>) -> Vec<&'a Migration> {
    let mut pending: Vec<_> = migrations
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();
    pending.sort_by_key(|m| m.version);
    pending
}

/// Brings the restaurant schema up to date
pub async fn run_restaurant_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let ran = PostgresMigrator::new(pool.clone())
        .migrate(RESTAURANT_MIGRATIONS)
        .await?;

    match ran {
        0 => debug!("Restaurant schema up to date"),
        n => info!(applied = n, "Restaurant schema migrated"),
    }
    Ok(())
}
