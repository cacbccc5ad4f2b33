//! Error handling for the Restaurant POS admin backend
//!
//! Every failure leaves the API as the same JSON envelope with a stable code

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::models::TransitionError;
use thiserror::Error;

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for a value outside its column's precision
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

fn has_sqlstate(err: &sqlx::Error, sqlstate: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == sqlstate)
        .unwrap_or(false)
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions: requires {0}")]
    InsufficientPermissions(String),

    #[error("Invalid or expired nonce for action {0}")]
    InvalidNonce(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a field-level validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Map a unique violation on insert/update to `DuplicateEntry(field)`
    pub fn from_unique_violation(err: sqlx::Error, field: &str) -> Self {
        if has_sqlstate(&err, UNIQUE_VIOLATION) {
            AppError::DuplicateEntry(field.to_string())
        } else {
            AppError::DatabaseError(err)
        }
    }

    /// Map a unique violation on a state invariant (not a user-chosen key) to `Conflict`
    pub fn conflict_on_unique_violation(err: sqlx::Error, resource: &str, message: &str) -> Self {
        if has_sqlstate(&err, UNIQUE_VIOLATION) {
            AppError::Conflict {
                resource: resource.to_string(),
                message: message.to_string(),
            }
        } else {
            AppError::DatabaseError(err)
        }
    }

    /// Map a numeric overflow in a stored column to a validation failure on `field`
    pub fn from_numeric_overflow(err: sqlx::Error, field: &str, message: &str) -> Self {
        if has_sqlstate(&err, NUMERIC_VALUE_OUT_OF_RANGE) {
            AppError::validation(field, message)
        } else {
            AppError::DatabaseError(err)
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by_key(|(field, _)| **field);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::validation(field, message)
            }
            None => AppError::validation("input", "Invalid input"),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::InvalidStateTransition(err.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", msg.clone()),
            ),
            AppError::InsufficientPermissions(capability) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    format!("You do not have permission to perform this action ({})", capability),
                ),
            ),
            AppError::InvalidNonce(action) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INVALID_NONCE",
                    format!("The link you followed has expired (action: {})", action),
                ),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message: format!("A record with this {} already exists", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: message.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INVALID_STATE_TRANSITION", msg.clone()),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use validator::Validate;

    #[derive(Debug)]
    struct PgError(&'static str);

    impl std::fmt::Display for PgError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "postgres error {}", self.0)
        }
    }

    impl std::error::Error for PgError {}

    impl DatabaseError for PgError {
        fn message(&self) -> &str {
            "postgres error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                UNIQUE_VIOLATION => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn pg_error(sqlstate: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgError(sqlstate)))
    }

    fn body_json(response: Response) -> serde_json::Value {
        let bytes = tokio_test::block_on(axum::body::to_bytes(response.into_body(), usize::MAX))
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_not_found_response() {
        let response = AppError::NotFound("Category".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Category not found");
        assert!(body["error"].get("field").is_none());
    }

    #[test]
    fn test_duplicate_entry_is_conflict() {
        let response = AppError::DuplicateEntry("name".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response)["error"]["field"], "name");
    }

    #[test]
    fn test_unique_violation_on_active_batch_is_conflict() {
        let err = AppError::conflict_on_unique_violation(
            pg_error(UNIQUE_VIOLATION),
            "oil_batch",
            "Another batch was started on this fryer",
        );
        assert!(matches!(err, AppError::Conflict { .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response);
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["field"], "oil_batch");

        let other = AppError::conflict_on_unique_violation(pg_error("40001"), "oil_batch", "x");
        assert!(matches!(other, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_numeric_overflow_is_validation_error() {
        let err = AppError::from_numeric_overflow(
            pg_error(NUMERIC_VALUE_OUT_OF_RANGE),
            "quantity",
            "Stock balance is out of range",
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let dup = AppError::from_unique_violation(pg_error(UNIQUE_VIOLATION), "name");
        assert!(matches!(dup, AppError::DuplicateEntry(field) if field == "name"));
        assert!(matches!(
            AppError::from_unique_violation(pg_error(NUMERIC_VALUE_OUT_OF_RANGE), "name"),
            AppError::DatabaseError(_)
        ));
    }

    #[test]
    fn test_transition_error_maps_to_422() {
        let err: AppError = OrderStatus::Completed
            .transition(OrderStatus::Pending)
            .unwrap_err()
            .into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validator_errors_keep_field_and_message() {
        let input = shared::models::CreateCategoryInput {
            name: String::new(),
            description: None,
        };
        let err: AppError = input.validate().unwrap_err().into();

        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "name");
                assert_eq!(message, "Category name must be 1-100 characters");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_permission_and_nonce_are_forbidden() {
        assert_eq!(
            AppError::InsufficientPermissions("fryers:manage".to_string())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidNonce("fryer".to_string()).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
