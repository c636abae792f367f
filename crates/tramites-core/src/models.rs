//! Domain models and strongly-typed identifiers for requests.
//!
//! A request is created `pending` by a user and is decided exactly once.
//! Approval records where the generated approval document was written.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Maximum length of `requests.approval_document_path`, matching the
/// `VARCHAR(255)` column.
pub const APPROVAL_DOCUMENT_PATH_MAX_LEN: usize = 255;

/// Maximum length of `requests.title`.
pub const TITLE_MAX_LEN: usize = 200;

/// Strongly-typed request identifier.
///
/// # Example
///
/// ```
/// use tramites_core::models::RequestId;
/// let id = RequestId::new();
/// println!("Processing request: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Creates a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl sqlx::Type<PgDb> for RequestId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for RequestId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for RequestId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Lifecycle state of a request.
///
/// State transitions:
/// - `Pending` → `Approved` (approval document generated)
/// - `Pending` → `Rejected`
///
/// Decided states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; the approval document path is set.
    Approved,
    /// Rejected.
    Rejected,
}

impl RequestStatus {
    /// Database representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true once the request has been approved or rejected.
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::InvalidInput(format!("unknown request status '{other}'"))),
        }
    }
}

impl sqlx::Type<PgDb> for RequestStatus {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for RequestStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(s.parse()?)
    }
}

impl sqlx::Encode<'_, PgDb> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <&str as sqlx::Encode<PgDb>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// File-system path of a generated approval document.
///
/// Non-empty and at most [`APPROVAL_DOCUMENT_PATH_MAX_LEN`] characters.
/// The path is stored as given; nothing checks that the file exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApprovalDocumentPath(String);

impl ApprovalDocumentPath {
    /// Validates and wraps a document path.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if the path is blank or longer
    /// than the column allows.
    pub fn new(path: impl Into<String>) -> Result<Self, CoreError> {
        let path = path.into();

        if path.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "approval document path must not be empty".to_string(),
            ));
        }

        let len = path.chars().count();
        if len > APPROVAL_DOCUMENT_PATH_MAX_LEN {
            return Err(CoreError::InvalidInput(format!(
                "approval document path is {len} characters, maximum is \
                 {APPROVAL_DOCUMENT_PATH_MAX_LEN}"
            )));
        }

        Ok(Self(path))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApprovalDocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ApprovalDocumentPath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApprovalDocumentPath> for String {
    fn from(path: ApprovalDocumentPath) -> Self {
        path.0
    }
}

/// A persisted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Request {
    /// Unique identifier.
    pub id: RequestId,
    /// Identifier of the user who filed the request, as received from the
    /// identity header.
    pub user_id: String,
    /// Short human-readable title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Path to the generated approval document, set once on approval.
    pub approval_document_path: Option<String>,
    /// When the request was filed.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// When the request was approved or rejected.
    pub decided_at: Option<DateTime<Utc>>,
}

/// Data required to file a new request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    /// Identifier of the filing user.
    pub user_id: String,
    /// Short human-readable title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewRequest {
    /// Checks field bounds before the insert reaches the database.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` for a blank user or title, or a
    /// title longer than [`TITLE_MAX_LEN`] characters.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.user_id.is_empty() {
            return Err(CoreError::InvalidInput("user_id must not be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::InvalidInput("title must not be empty".to_string()));
        }
        if self.title.chars().count() > TITLE_MAX_LEN {
            return Err(CoreError::InvalidInput(format!(
                "title exceeds {TITLE_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}
