//! Identity header gate.
//!
//! Requests must carry the caller's user identifier in `x-user-id`. The
//! value is trusted as-is: there is no signature, expiry or user lookup.
//! Present values are attached to the request as [`CurrentUser`]; absent
//! ones end the request with `401` and a fixed JSON body.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Header carrying the caller's user identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Error message returned to callers without an identity.
pub const UNAUTHENTICATED_MESSAGE: &str = "Usuario no autenticado";

/// Identity attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    /// Raw identifier from the identity header, unvalidated.
    pub id: String,
}

/// Extracts the user identifier from the identity header.
///
/// Any non-empty value is accepted. Bytes that are not valid UTF-8 are
/// replaced rather than rejected, so presence is the only condition.
fn extract_user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|s| !s.is_empty())
}

/// Errors that can occur during identity extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The identity header is missing from the request.
    MissingUserId,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingUserId => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": UNAUTHENTICATED_MESSAGE })))
                    .into_response()
            },
        }
    }
}

/// Axum middleware that rejects requests without an identity header.
pub async fn require_user(mut req: Request<Body>, next: Next) -> Result<Response, AuthError> {
    let Some(user_id) = extract_user_id(req.headers()) else {
        debug!(
            method = %req.method(),
            path = %req.uri().path(),
            "rejecting request without identity header"
        );
        return Err(AuthError::MissingUserId);
    };

    debug!(user_id = %user_id, "identity attached");
    req.extensions_mut().insert(CurrentUser { id: user_id });

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or(AuthError::MissingUserId)
    }
}
