//! Classification rules: severity to priority, regulatory forcing.

use crate::{Category, Priority, Severity};

/// Fixed severity to priority mapping.
pub fn priority_for(severity: Severity) -> Priority {
    match severity {
        Severity::Critical => Priority::P1,
        Severity::High => Priority::P2,
        Severity::Medium => Priority::P3,
        Severity::Low => Priority::P4,
    }
}

/// Safety category with Critical severity always carries the regulatory flag.
pub fn regulatory_forced(category: Category, severity: Severity) -> bool {
    category == Category::Safety && severity == Severity::Critical
}

/// Resolve the regulatory flag for a triage.
///
/// The caller's input wins when given, otherwise the current value is kept.
/// The forcing rule is applied last and cannot be overridden.
pub fn resolve_regulatory_flag(
    requested: Option<bool>,
    current: bool,
    category: Category,
    severity: Severity,
) -> bool {
    requested.unwrap_or(current) || regulatory_forced(category, severity)
}

/// Priority after a severity change, honoring an explicit override.
pub fn effective_priority(
    severity: Severity,
    current: Priority,
    overridden: bool,
) -> Priority {
    if overridden {
        current
    } else {
        priority_for(severity)
    }
}
