//! Request lifecycle handlers.
//!
//! The gate carries no roles, so every identified caller may read and decide
//! any request by id. Listing is the one scoped view: it returns the
//! requests the caller filed.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::{info, instrument};
use tramites_core::{ApprovalDocumentPath, NewRequest, Request, RequestId};
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::{JsonBody, PathParams, QueryParams},
    AppState, CurrentUser,
};

/// Upper bound for `GET /requests?limit=`.
const MAX_LIST_LIMIT: i64 = 500;

/// Body of `POST /requests`.
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// Short human-readable title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /requests/{id}/approve`.
#[derive(Debug, Deserialize)]
pub struct ApproveRequestBody {
    /// Where the generated approval document was written.
    pub approval_document_path: String,
}

/// Query parameters of `GET /requests`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Maximum number of requests to return.
    pub limit: Option<i64>,
}

/// Files a new request for the caller.
#[instrument(name = "create_request", skip(state, body), fields(user_id = %user.id))]
pub async fn create_request(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<CreateRequestBody>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    let new = NewRequest { user_id: user.id, title: body.title, description: body.description };

    let request = state.storage.requests.create(&new).await?;
    info!(request_id = %request.id, "request filed");

    Ok((StatusCode::CREATED, Json(request)))
}

/// Lists the caller's requests, newest first.
#[instrument(name = "list_requests", skip(state), fields(user_id = %user.id))]
pub async fn list_requests(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Request>>, ApiError> {
    let limit = params.limit.map(|l| l.clamp(1, MAX_LIST_LIMIT));
    let requests = state.storage.requests.list_for_user(&user.id, limit).await?;

    Ok(Json(requests))
}

/// Returns a request by id.
#[instrument(name = "get_request", skip(state), fields(user_id = %user.id))]
pub async fn get_request(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let id = RequestId(id);

    state
        .storage
        .requests
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("request {id} not found")))
}

/// Approves a pending request and records its approval document.
#[instrument(name = "approve_request", skip(state, body), fields(user_id = %user.id))]
pub async fn approve_request(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParams(id): PathParams<Uuid>,
    JsonBody(body): JsonBody<ApproveRequestBody>,
) -> Result<Json<Request>, ApiError> {
    let path = ApprovalDocumentPath::new(body.approval_document_path)?;

    let request = state.storage.requests.approve(RequestId(id), &path).await?;
    info!(request_id = %request.id, path = %path, "request approved");

    Ok(Json(request))
}

/// Rejects a pending request.
#[instrument(name = "reject_request", skip(state), fields(user_id = %user.id))]
pub async fn reject_request(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<Request>, ApiError> {
    let request = state.storage.requests.reject(RequestId(id)).await?;
    info!(request_id = %request.id, "request rejected");

    Ok(Json(request))
}
