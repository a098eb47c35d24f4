//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                           │
//! │       │                                                                 │
//! │       ├── CheckoutError ──┐                                             │
//! │       ├── StoreError ─────┼──► ApiError { code, message } ──► status    │
//! │       └── DbError ────────┘                                  + JSON     │
//! │                                                                         │
//! │  Client errors keep their message. System errors are logged here and   │
//! │  reported with a generic message.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tally_checkout::{CheckoutError, StoreError};
use tally_db::DbError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "The product MacBook Pro qty is not enough to fulfill the request: 1 available, 2 requested"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Requested quantity exceeds stock (409)
    InsufficientStock,

    /// Unexpected failure (500)
    Internal,

    /// Database unavailable or failing (503)
    DatabaseError,

    /// Checkout deadline elapsed (504)
    Timeout,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts checkout errors to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidRequest(_) => ApiError::validation(err.to_string()),
            CheckoutError::ProductNotFound { product_id } => {
                ApiError::not_found("Product", product_id)
            }
            CheckoutError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CheckoutError::TimedOut { .. } => {
                ApiError::new(ErrorCode::Timeout, "Checkout did not finish in time")
            }
            CheckoutError::InvalidPromotion(_) | CheckoutError::AmountOverflow { .. } => {
                tracing::error!(error = %err, kind = err.kind(), "Catalog data cannot be priced");
                ApiError::new(ErrorCode::Internal, "Checkout failed")
            }
            other => {
                // The orchestrator already logged the cause.
                tracing::debug!(kind = other.kind(), "Reporting checkout failure");
                ApiError::new(ErrorCode::DatabaseError, "Checkout failed")
            }
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            StoreError::StockExhausted { product_id } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!("Not enough stock left for product {}", product_id),
            ),
            StoreError::Backend(message) => {
                tracing::error!("Store operation failed: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::Invalid(err) => ApiError::validation(err.to_string()),
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}
