//! Tramites request approval service.
//!
//! Main entry point. Serves the HTTP API by default and exposes the schema
//! migrations as subcommands.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tramites_api::Config;
use tramites_core::migrations;

/// Request approval backend.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations and serve the HTTP API (default).
    Serve,

    /// Manage the database schema.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Debug, Subcommand)]
enum MigrateAction {
    /// Apply every pending migration.
    Up,

    /// Revert the latest migration, or every migration above `--to`.
    Down {
        /// Keep migrations up to and including this version.
        #[arg(long)]
        to: Option<i64>,
    },

    /// List applied versions and the columns of the requests table.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_tracing(&config);

    info!(
        app = %config.app_name,
        env = %config.app_env,
        database_url = %config.database_url_masked(),
        port = config.port,
        "Configuration loaded"
    );

    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, db_pool.clone()).await,
        Command::Migrate { action } => migrate(&db_pool, action).await,
    };

    db_pool.close().await;
    info!("Database connections closed");

    result
}

async fn serve(config: &Config, db_pool: sqlx::PgPool) -> Result<()> {
    migrations::run(&db_pool).await.context("Failed to run database migrations")?;

    let addr = config.parse_server_addr()?;
    info!(app = %config.app_name, addr = %addr, "Ready to receive requests");

    if let Err(e) = tramites_api::start_server(db_pool, addr, config.request_timeout()).await {
        error!(error = %e, "Server failed");
        return Err(e).context("HTTP server failed");
    }

    info!("Shutdown complete");
    Ok(())
}

async fn migrate(db_pool: &sqlx::PgPool, action: MigrateAction) -> Result<()> {
    match action {
        MigrateAction::Up => {
            migrations::run(db_pool).await.context("Failed to apply migrations")?;
        },
        MigrateAction::Down { to: Some(target) } => {
            migrations::revert_to(db_pool, target)
                .await
                .with_context(|| format!("Failed to revert migrations above {target}"))?;
        },
        MigrateAction::Down { to: None } => {
            match migrations::revert_last(db_pool).await.context("Failed to revert migration")? {
                Some(version) => info!(version, "Reverted migration"),
                None => info!("No applied migrations to revert"),
            }
        },
        MigrateAction::Status => {
            let applied = migrations::applied_versions(db_pool).await?;
            info!(?applied, latest = ?migrations::latest_version(), "Migration status");

            for column in migrations::table_columns(db_pool, "requests").await? {
                info!(
                    column = %column.column_name,
                    data_type = %column.data_type,
                    nullable = column.is_nullable,
                    max_length = ?column.character_maximum_length,
                    "requests column"
                );
            }
        },
    }

    Ok(())
}

/// Initializes tracing; production emits JSON lines.
fn init_tracing(config: &Config) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(&config.rust_log)
        .unwrap_or_else(|_| EnvFilter::new("info,tramites=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.app_env.is_production() {
        registry.with(fmt::layer().json().with_current_span(true).with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .init();
    }
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let mut retries = 0;
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(config.database_connection_timeout())
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(_e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["tramites"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn migrate_down_accepts_target_version() {
        let cli = Cli::try_parse_from(["tramites", "migrate", "down", "--to", "20240301000000"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Migrate { action: MigrateAction::Down { to: Some(20240301000000) } })
        ));
    }
}
