//! Core domain models, storage and schema migrations.
//!
//! Provides the request entity and its approval lifecycle, the repository
//! layer over PostgreSQL, and the embedded reversible migrations that shape
//! the schema. The API crate and the binary build on these types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod migrations;
pub mod models;
pub mod storage;

pub use error::{CoreError, Result};
pub use models::{ApprovalDocumentPath, NewRequest, Request, RequestId, RequestStatus};
pub use storage::Storage;
