//! Database testing utilities.
//!
//! Creates a uniquely named PostgreSQL database per test from the server in
//! `TEST_DATABASE_URL`, bootstraps the schema, and drops it on cleanup.

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use querycount_core::storage::Repository;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::debug;
use uuid::Uuid;

/// Environment variable naming the admin connection for test databases.
pub const TEST_DATABASE_URL_VAR: &str = "TEST_DATABASE_URL";

/// Isolated PostgreSQL database for a single test.
pub struct TestDatabase {
    pool: PgPool,
    admin_options: PgConnectOptions,
    database_name: String,
}

impl TestDatabase {
    /// Creates a fresh database with the submissions schema applied.
    pub async fn new() -> Result<Self> {
        let url = std::env::var(TEST_DATABASE_URL_VAR)
            .with_context(|| format!("{TEST_DATABASE_URL_VAR} not set"))?;
        let admin_options =
            PgConnectOptions::from_str(&url).context("invalid TEST_DATABASE_URL")?;

        let database_name = format!("querycount_test_{}", Uuid::new_v4().simple());

        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(admin_options.clone())
            .await
            .context("Failed to connect to PostgreSQL admin database")?;

        sqlx::query(&format!("CREATE DATABASE \"{database_name}\""))
            .execute(&admin_pool)
            .await
            .context("Failed to create test database")?;
        admin_pool.close().await;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(admin_options.clone().database(&database_name))
            .await
            .context("Failed to connect to PostgreSQL test database")?;

        Repository::new(Arc::new(pool.clone()))
            .ensure_schema()
            .await
            .context("Failed to create submissions schema")?;

        debug!(database = %database_name, "Created test database");
        Ok(Self { pool, admin_options, database_name })
    }

    /// Returns a repository bound to this database.
    pub fn repository(&self) -> Repository {
        Repository::new(Arc::new(self.pool.clone()))
    }

    /// Closes the pool and drops the database.
    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;

        let admin_pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(self.admin_options)
            .await
            .context("Failed to reconnect to PostgreSQL admin database")?;

        sqlx::query(&format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.database_name))
            .execute(&admin_pool)
            .await
            .context("Failed to drop test database")?;
        admin_pool.close().await;

        Ok(())
    }
}
