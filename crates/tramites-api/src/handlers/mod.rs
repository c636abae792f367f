//! HTTP request handlers.
//!
//! Health endpoints are public; everything else runs behind the identity
//! gate and receives the caller as [`crate::CurrentUser`].

pub mod health;
pub mod requests;

use axum::Json;
use serde::Serialize;

pub use health::{health_check, liveness_check};
pub use requests::{approve_request, create_request, get_request, list_requests, reject_request};

use crate::CurrentUser;

/// Response body of `GET /me`.
#[derive(Debug, Serialize)]
pub struct WhoAmI {
    /// Identifier taken from the identity header.
    pub user_id: String,
}

/// Echoes the identity attached by the gate.
pub async fn whoami(user: CurrentUser) -> Json<WhoAmI> {
    Json(WhoAmI { user_id: user.id })
}
