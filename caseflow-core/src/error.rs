//! Error types for Caseflow operations

use crate::{CaseId, CaseStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of stored record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Case,
    Link,
    AuditEntry,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordType::Case => "case",
            RecordType::Link => "link",
            RecordType::AuditEntry => "audit entry",
        })
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{record_type} not found: {id}")]
    NotFound { record_type: RecordType, id: String },

    #[error("Insert failed for {record_type}: {reason}")]
    InsertFailed {
        record_type: RecordType,
        reason: String,
    },

    #[error("Update failed for {record_type} {id}: {reason}")]
    UpdateFailed {
        record_type: RecordType,
        id: String,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn case_not_found(id: &CaseId) -> Self {
        StorageError::NotFound {
            record_type: RecordType::Case,
            id: id.to_string(),
        }
    }
}

/// Validation errors. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Constraint violation on {constraint}: {reason}")]
    ConstraintViolation { constraint: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Workflow state machine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The command is not declared legal in the case's current status.
    #[error("Illegal transition for {case_id}: {command} is not allowed in state {current} (allowed: {})", .allowed.join(", "))]
    IllegalTransition {
        case_id: CaseId,
        current: CaseStatus,
        command: String,
        allowed: Vec<String>,
    },

    /// Another command changed the case between read and write.
    #[error("Conflict on {case_id}: expected version {expected_version}, found {actual_version}")]
    Conflict {
        case_id: CaseId,
        expected_version: u64,
        actual_version: u64,
    },

    /// Data integrity problem, e.g. an active case without a due date.
    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Case {case_id} is in terminal state {status}")]
    AlreadyTerminal { case_id: CaseId, status: CaseStatus },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Caseflow errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseflowError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Caseflow operations.
pub type CaseflowResult<T> = Result<T, CaseflowError>;

// =============================================================================
// TESTS
// =============================================================================
