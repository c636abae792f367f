//! Tramites HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use sqlx::PgPool;
use tramites_core::Storage;

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::{Config, Environment};
pub use middleware::auth::{require_user, CurrentUser};
pub use server::{create_router, start_server};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Repository access.
    pub storage: Arc<Storage>,
}

impl AppState {
    /// Builds the state over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { storage: Arc::new(Storage::new(pool)) }
    }
}
