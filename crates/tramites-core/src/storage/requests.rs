//! Repository for request database operations.
//!
//! Requests are always read through the same column list so every query
//! decodes into [`Request`]. Decisions are guarded by `status = 'pending'`
//! in the `UPDATE` itself, which makes approval a set-once operation even
//! under concurrent callers.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::debug;

use crate::{
    error::{CoreError, Result},
    models::{ApprovalDocumentPath, NewRequest, Request, RequestId, RequestStatus},
};

/// Repository for request database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Files a new pending request.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if the fields are out of bounds, or
    /// a database error if the insert fails.
    pub async fn create(&self, new: &NewRequest) -> Result<Request> {
        new.validate()?;

        let request = sqlx::query_as::<_, Request>(
            r"
            INSERT INTO requests (id, user_id, title, description, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, status, approval_document_path,
                      created_at, updated_at, decided_at
            ",
        )
        .bind(RequestId::new())
        .bind(&new.user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(RequestStatus::Pending)
        .fetch_one(&*self.pool)
        .await?;

        debug!(request_id = %request.id, user_id = %request.user_id, "request created");

        Ok(request)
    }

    /// Finds a request by ID.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>> {
        let request = sqlx::query_as::<_, Request>(
            r"
            SELECT id, user_id, title, description, status, approval_document_path,
                   created_at, updated_at, decided_at
            FROM requests
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(request)
    }

    /// Lists requests filed by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn list_for_user(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<Request>> {
        let requests = sqlx::query_as::<_, Request>(
            r"
            SELECT id, user_id, title, description, status, approval_document_path,
                   created_at, updated_at, decided_at
            FROM requests
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(limit.unwrap_or(100))
        .fetch_all(&*self.pool)
        .await?;

        Ok(requests)
    }

    /// Approves a pending request and records its approval document path.
    ///
    /// The path is written exactly once: a request that is already decided
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown ID and
    /// `CoreError::Conflict` if the request is no longer pending.
    pub async fn approve(&self, id: RequestId, path: &ApprovalDocumentPath) -> Result<Request> {
        let updated = sqlx::query_as::<_, Request>(
            r"
            UPDATE requests
            SET status = $2,
                approval_document_path = $3,
                decided_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, title, description, status, approval_document_path,
                      created_at, updated_at, decided_at
            ",
        )
        .bind(id)
        .bind(RequestStatus::Approved)
        .bind(path.as_str())
        .fetch_optional(&*self.pool)
        .await?;

        match updated {
            Some(request) => {
                debug!(request_id = %id, path = %path, "request approved");
                Ok(request)
            },
            None => Err(self.undecidable(id).await),
        }
    }

    /// Rejects a pending request.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for an unknown ID and
    /// `CoreError::Conflict` if the request is no longer pending.
    pub async fn reject(&self, id: RequestId) -> Result<Request> {
        let updated = sqlx::query_as::<_, Request>(
            r"
            UPDATE requests
            SET status = $2, decided_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, title, description, status, approval_document_path,
                      created_at, updated_at, decided_at
            ",
        )
        .bind(id)
        .bind(RequestStatus::Rejected)
        .fetch_optional(&*self.pool)
        .await?;

        match updated {
            Some(request) => {
                debug!(request_id = %id, "request rejected");
                Ok(request)
            },
            None => Err(self.undecidable(id).await),
        }
    }

    /// Counts all requests.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM requests")
            .fetch_one(&*self.pool)
            .await?;

        Ok(count.0)
    }

    /// Explains why a guarded decision updated no row.
    async fn undecidable(&self, id: RequestId) -> CoreError {
        match self.find_by_id(id).await {
            Ok(Some(existing)) if existing.status.is_decided() => CoreError::Conflict(format!(
                "request {id} is already {}",
                existing.status
            )),
            // Still pending: the row changed between the update and this read.
            Ok(Some(_)) => CoreError::Conflict(format!("request {id} changed concurrently")),
            Ok(None) => CoreError::NotFound(format!("request {id} not found")),
            Err(e) => e,
        }
    }
}
