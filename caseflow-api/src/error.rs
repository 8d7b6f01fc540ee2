//! Error Types for the Caseflow API
//!
//! Every failure leaves the API as JSON `{code, message, details?}` with the
//! HTTP status implied by `code`. Workflow refusals keep their specifics
//! (current state, attempted command, allowed commands) in `details`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use caseflow_core::{CaseflowError, StorageError, ValidationError, WorkflowError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested case does not exist
    CaseNotFound,

    /// Requested link does not exist
    LinkNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Command is not legal in the case's current state
    IllegalTransition,

    /// Concurrent modification detected (optimistic locking failure)
    ConcurrentModification,

    /// Operation conflicts with current state
    StateConflict,

    // ========================================================================
    // Server Errors (500, 504)
    // ========================================================================
    /// Stored case violates a structural invariant
    InvalidState,

    /// Internal server error
    InternalError,

    /// Operation timed out
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::InvalidInput | ErrorCode::MissingField => {
                StatusCode::BAD_REQUEST
            }

            ErrorCode::CaseNotFound | ErrorCode::LinkNotFound => StatusCode::NOT_FOUND,

            ErrorCode::IllegalTransition
            | ErrorCode::ConcurrentModification
            | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::InvalidState | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::CaseNotFound => "Case not found",
            ErrorCode::LinkNotFound => "Link not found",
            ErrorCode::IllegalTransition => "Command not allowed in the current state",
            ErrorCode::ConcurrentModification => "Concurrent modification detected",
            ErrorCode::StateConflict => "Operation conflicts with current state",
            ErrorCode::InvalidState => "Case is in an invalid state",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::Timeout => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
        .with_details(json!({ "field": field }))
    }

    pub fn case_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::CaseNotFound, format!("Case {} not found", id))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn timeout(operation: &str) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Operation '{}' timed out", operation),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = err.to_string();
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::new(ErrorCode::ValidationFailed, message)
                    .with_details(json!({ "field": field, "reason": reason }))
            }
            ValidationError::ConstraintViolation { constraint, reason } => {
                ApiError::new(ErrorCode::ValidationFailed, message)
                    .with_details(json!({ "constraint": constraint, "reason": reason }))
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::NotFound { record_type, id } => {
                let code = match record_type {
                    caseflow_core::RecordType::Link => ErrorCode::LinkNotFound,
                    _ => ErrorCode::CaseNotFound,
                };
                ApiError::new(code, message)
                    .with_details(json!({ "recordType": record_type.to_string(), "id": id }))
            }
            other => {
                tracing::error!(error = %other, "Storage failure");
                ApiError::internal_error("Storage operation failed")
            }
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::IllegalTransition {
                case_id,
                current,
                command,
                allowed,
            } => ApiError::new(ErrorCode::IllegalTransition, message).with_details(json!({
                "caseId": case_id,
                "current": current.label(),
                "command": command,
                "allowed": allowed,
            })),
            WorkflowError::Conflict {
                case_id,
                expected_version,
                actual_version,
            } => ApiError::new(ErrorCode::ConcurrentModification, message).with_details(json!({
                "caseId": case_id,
                "expectedVersion": expected_version,
                "actualVersion": actual_version,
            })),
            WorkflowError::AlreadyTerminal { case_id, status } => {
                ApiError::new(ErrorCode::StateConflict, message).with_details(json!({
                    "caseId": case_id,
                    "current": status.label(),
                }))
            }
            WorkflowError::InvalidState { reason } => {
                tracing::error!(%reason, "Case in invalid state");
                ApiError::new(ErrorCode::InvalidState, message)
            }
        }
    }
}

impl From<CaseflowError> for ApiError {
    fn from(err: CaseflowError) -> Self {
        match err {
            CaseflowError::Validation(e) => e.into(),
            CaseflowError::Storage(e) => e.into(),
            CaseflowError::Workflow(e) => e.into(),
            CaseflowError::Config(e) => {
                tracing::error!(error = %e, "Configuration error");
                ApiError::internal_error(e.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("Invalid payload: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match rejection {
            JsonRejection::JsonDataError(_) => ErrorCode::ValidationFailed,
            _ => ErrorCode::InvalidInput,
        };
        ApiError::new(code, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

pub type ApiResult<T> = Result<T, ApiError>;
