//! Database access layer implementing the repository pattern.
//!
//! All SQL touching domain tables lives in these repositories. Schema
//! changes go through [`crate::migrations`].

use std::sync::Arc;

use sqlx::PgPool;

pub mod requests;

use crate::error::Result;

/// Container for all repository instances providing unified database access.
#[derive(Clone)]
pub struct Storage {
    /// Repository for request operations.
    pub requests: Arc<requests::Repository>,

    pool: Arc<PgPool>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);

        Self { requests: Arc::new(requests::Repository::new(pool.clone())), pool }
    }

    /// Performs a health check on the database connection.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy or
    /// the query times out.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.pool).await?;

        Ok(())
    }
}
