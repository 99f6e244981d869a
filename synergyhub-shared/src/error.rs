//! Error types shared by the stores and the services built on top of them
//!
//! Two layers:
//!
//! - [`StoreError`]: what a persistence backend can report.
//! - [`ServiceError`]: what a service operation reports to its caller. This is
//!   the taxonomy the HTTP layer maps onto status codes.
//!
//! # Mapping
//!
//! | Variant                   | HTTP |
//! |---------------------------|------|
//! | `ServiceError::Validation`| 400  |
//! | `ServiceError::NotFound`  | 404  |
//! | `ServiceError::Conflict`  | 400  |
//! | `ServiceError::Internal`  | 500  |

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A write referenced a record that does not exist
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Backend cannot serve requests
    #[error("Store unavailable")]
    Unavailable,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing required input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record collides with an existing one
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected failure in a store operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
