//! SLA evaluation
//!
//! Pure functions only. SLA status is recomputed on every read and never
//! stored.

use crate::{SlaStatus, Timestamp, WorkflowError};
use chrono::Duration;

/// Evaluate a due date against `now`.
///
/// - `breached` if `now > due`
/// - `warning` if `due - now <= window`
/// - `ok` otherwise
///
/// A missing due date is a data-integrity problem and yields
/// [`WorkflowError::InvalidState`].
pub fn evaluate(
    due: Option<Timestamp>,
    now: Timestamp,
    window: Duration,
) -> Result<SlaStatus, WorkflowError> {
    let due = due.ok_or_else(|| WorkflowError::InvalidState {
        reason: "SLA evaluated without a due date".to_string(),
    })?;
    Ok(classify(due, now, window))
}

/// Infallible core of [`evaluate`].
pub fn classify(due: Timestamp, now: Timestamp, window: Duration) -> SlaStatus {
    if now > due {
        SlaStatus::Breached
    } else if due - now <= window {
        SlaStatus::Warning
    } else {
        SlaStatus::Ok
    }
}

/// Time left until `due`; negative once breached.
pub fn remaining(due: Timestamp, now: Timestamp) -> Duration {
    due - now
}
