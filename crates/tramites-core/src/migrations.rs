//! Embedded, reversible schema migrations.
//!
//! Each migration is a pair of `<version>_<name>.up.sql` / `.down.sql`
//! files under `migrations/`, compiled into the binary with
//! `sqlx::migrate!`. Applying and reverting run through the sqlx migrator,
//! so every step executes inside its own transaction and any failure is
//! surfaced as `CoreError::Migration` with the migrator's message intact.

use sqlx::{migrate::Migrator, PgPool};
use tracing::info;

use crate::error::Result;

/// All migrations known to this build, in version order.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Version of the migration creating the `requests` table.
pub const CREATE_REQUESTS: i64 = 20240301000000;

/// Version of the migration adding `requests.approval_document_path`.
pub const ADD_APPROVAL_DOCUMENT_PATH: i64 = 20240415000000;

/// A column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnInfo {
    /// Column name.
    pub column_name: String,
    /// SQL data type, e.g. `character varying`.
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub is_nullable: bool,
    /// Declared maximum length for character types.
    pub character_maximum_length: Option<i32>,
}

/// Applies every pending migration.
///
/// # Errors
///
/// Returns `CoreError::Migration` if a migration fails or the applied
/// history no longer matches the embedded files.
pub async fn run(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    info!(latest = ?latest_version(), "database migrations applied");
    Ok(())
}

/// Reverts applied migrations until only those at or below `target` remain.
///
/// A `target` of `0` reverts everything.
///
/// # Errors
///
/// Returns `CoreError::Migration` if a down step fails.
pub async fn revert_to(pool: &PgPool, target: i64) -> Result<()> {
    MIGRATOR.undo(pool, target).await?;
    info!(target, "database migrations reverted");
    Ok(())
}

/// Reverts the most recently applied migration.
///
/// Returns the reverted version, or `None` when nothing was applied.
///
/// # Errors
///
/// Returns `CoreError::Migration` if the down step fails.
pub async fn revert_last(pool: &PgPool) -> Result<Option<i64>> {
    let applied = applied_versions(pool).await?;

    let Some((&last, rest)) = applied.split_last() else {
        return Ok(None);
    };

    let target = rest.last().copied().unwrap_or(0);
    revert_to(pool, target).await?;

    Ok(Some(last))
}

/// Returns the versions recorded as successfully applied, ascending.
///
/// A database that has never been migrated yields an empty list.
///
/// # Errors
///
/// Returns `CoreError::Database` if the history table cannot be read.
pub async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
    let exists: bool = sqlx::query_scalar(
        r"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name = '_sqlx_migrations'
        )
        ",
    )
    .fetch_one(pool)
    .await?;

    if !exists {
        return Ok(Vec::new());
    }

    let versions = sqlx::query_scalar(
        r"
        SELECT version FROM _sqlx_migrations
        WHERE success = TRUE
        ORDER BY version
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(versions)
}

/// Returns the columns of `table` in the current schema, in ordinal order.
///
/// # Errors
///
/// Returns `CoreError::Database` if the catalog query fails.
pub async fn table_columns(pool: &PgPool, table: &str) -> Result<Vec<ColumnInfo>> {
    let columns = sqlx::query_as::<_, ColumnInfo>(
        r"
        SELECT column_name::TEXT AS column_name,
               data_type::TEXT AS data_type,
               (is_nullable = 'YES') AS is_nullable,
               character_maximum_length::INT4 AS character_maximum_length
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = $1
        ORDER BY ordinal_position
        ",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    Ok(columns)
}

/// Version of the newest embedded migration.
pub fn latest_version() -> Option<i64> {
    MIGRATOR.iter().map(|m| m.version).max()
}
