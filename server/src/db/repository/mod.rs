//! Repository Module
//!
//! Provides tenant-scoped CRUD over the SQLite pool. Every query that can
//! touch more than one organization's data takes the organization id and
//! filters on it; a row in another tenant is indistinguishable from no row.

pub mod dining_table;
pub mod order;
pub mod organization;
pub mod payment;
pub mod product;
pub mod user;

// Re-exports
pub use dining_table::DiningTableRepository;
pub use order::OrderRepository;
pub use organization::OrganizationRepository;
pub use payment::PaymentRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use shared::ErrorCode;
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Generate a fresh row id (UUID v4, hyphenated text form).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
