//! # Service Error Type
//!
//! The single error type returned by every orchestrator operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockflow                              │
//! │                                                                         │
//! │  ValidationError ──┐                                                    │
//! │  CoreError ────────┼──► ServiceError ──► ErrorResponse { code, message }│
//! │  DbError ──────────┘        │                                           │
//! │                             ├── status_code()  400-class / 500          │
//! │                             └── is_retryable() infrastructure only      │
//! │                                                                         │
//! │  Business outcomes (Validation, NotFound, Conflict, InsufficientStock,  │
//! │  Forbidden, AlreadyInState) never carry a storage error.                │
//! │  Infrastructure / CompensationFailed always do.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use stockflow_core::{CoreError, ValidationError};
use stockflow_db::DbError;

/// Errors returned by the order and purchase services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request rejected before anything was touched.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity missing, or visible only to another tenant.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Uniqueness collision or a lost optimistic-concurrency race.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The stock ledger rejected the batch. Carries product names.
    #[error("Insufficient stock for: {}", .products.join(", "))]
    InsufficientStock { products: Vec<String> },

    /// The actor does not own the entity.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Terminal or otherwise illegal state transition.
    #[error("{0}")]
    AlreadyInState(String),

    /// Storage failed. Nothing the caller did was wrong; retrying may work.
    #[error("Storage failure: {0}")]
    Infrastructure(#[source] DbError),

    /// An order failed to persist AND the stock restoration failed too.
    ///
    /// Stock for `reference` is under-counted until an operator
    /// reconciles it against the movement journal.
    #[error("Compensation failed for order {reference} (after: {original}): {source}")]
    CompensationFailed {
        reference: String,
        original: String,
        #[source]
        source: DbError,
    },
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// HTTP-style status for callers that expose the engine over a network.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound { .. } => 404,
            ServiceError::Conflict(_) | ServiceError::AlreadyInState(_) => 409,
            ServiceError::InsufficientStock { .. } => 422,
            ServiceError::Infrastructure(DbError::PoolExhausted) => 503,
            ServiceError::Infrastructure(_) | ServiceError::CompensationFailed { .. } => 500,
        }
    }

    /// True only for transient storage failures.
    ///
    /// `CompensationFailed` is not retryable: the first attempt's stock is
    /// still held, so a retry would take it twice.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Infrastructure(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Validation(_) => ErrorCode::ValidationError,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::Conflict(_) => ErrorCode::Conflict,
            ServiceError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            ServiceError::Forbidden(_) => ErrorCode::Forbidden,
            ServiceError::AlreadyInState(_) => ErrorCode::AlreadyInState,
            ServiceError::Infrastructure(_) => ErrorCode::Infrastructure,
            ServiceError::CompensationFailed { .. } => ErrorCode::CompensationFailed,
        }
    }
}

/// Converts database errors to service errors.
///
/// ## Mapping
/// ```text
/// DbError::NotFound         → NotFound
/// DbError::UniqueViolation  → Conflict
/// DbError::InvalidInput     → Validation
/// everything else           → Infrastructure
/// ```
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::UniqueViolation { field, .. } => {
                ServiceError::Conflict(format!("duplicate {field}"))
            }
            DbError::InvalidInput(msg) => ServiceError::Validation(msg),
            other => ServiceError::Infrastructure(other),
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(ids) => ServiceError::not_found("Product", ids.join(", ")),
            CoreError::InsufficientStock { products } => {
                ServiceError::InsufficientStock { products }
            }
            transition @ CoreError::InvalidTransition { .. } => {
                ServiceError::AlreadyInState(transition.to_string())
            }
            CoreError::Validation(v) => ServiceError::Validation(v.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

// =============================================================================
// Caller-facing view
// =============================================================================

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Conflict,
    InsufficientStock,
    Forbidden,
    AlreadyInState,
    Infrastructure,
    CompensationFailed,
}

/// What a caller receives when an operation fails:
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for: Cola Small" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        let message = match err {
            // Storage details stay in the logs
            ServiceError::Infrastructure(e) => {
                error!(error = %e, "Storage failure");
                "Storage operation failed".to_string()
            }
            ServiceError::CompensationFailed { reference, .. } => {
                format!("Order {reference} could not be completed; stock requires reconciliation")
            }
            other => other.to_string(),
        };

        ErrorResponse {
            code: err.code(),
            message,
        }
    }
}
