//! Test infrastructure for database-backed tests.
//!
//! Provides isolated PostgreSQL databases created per test, a [`TestEnv`]
//! bundling the database with the storage layer, and fixture builders.
//! Tests using it need a reachable server at `DATABASE_URL` and are run
//! with `cargo test -- --ignored`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tramites_core::{Request, Storage};

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::RequestBuilder;

/// Test environment with an isolated database and the storage layer.
pub struct TestEnv {
    database: TestDatabase,
    storage: Arc<Storage>,
}

impl TestEnv {
    /// Creates an environment on a fresh database with every migration
    /// applied.
    pub async fn new() -> Result<Self> {
        init_tracing();

        let database = TestDatabase::new_isolated().await?;
        tramites_core::migrations::run(database.pool())
            .await
            .context("failed to migrate test database")?;

        Ok(Self::from_database(database))
    }

    /// Creates an environment on a fresh database with no migrations
    /// applied, for tests that drive the migrator themselves.
    pub async fn new_unmigrated() -> Result<Self> {
        init_tracing();

        let database = TestDatabase::new_isolated().await?;
        Ok(Self::from_database(database))
    }

    fn from_database(database: TestDatabase) -> Self {
        let storage = Arc::new(Storage::new(database.pool().clone()));
        Self { database, storage }
    }

    /// Access to the database pool.
    pub fn pool(&self) -> &PgPool {
        self.database.pool()
    }

    /// Shared storage handle, as the API state expects it.
    pub fn storage(&self) -> Arc<Storage> {
        self.storage.clone()
    }

    /// Inserts a pending request filed by `user_id`.
    pub async fn create_request(&self, user_id: &str, title: &str) -> Result<Request> {
        let new = RequestBuilder::new().user(user_id).title(title).build();
        self.storage.requests.create(&new).await.context("failed to create test request")
    }

    /// Drops the isolated database.
    pub async fn cleanup(self) -> Result<()> {
        drop(self.storage);
        self.database.cleanup().await
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_test_writer()
        .try_init();
}
