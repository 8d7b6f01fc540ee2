//! Enum types for Caseflow records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error when parsing an enum from its string representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {type_name}: {value}")]
pub struct EnumParseError {
    pub type_name: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(type_name: &'static str, value: &str) -> Self {
        Self {
            type_name,
            value: value.to_string(),
        }
    }
}

/// Implements `as_db_str`, `from_db_str`, `Display`, `FromStr` and `ALL`
/// for a field-less enum. Parsing is case-insensitive and accepts aliases.
macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $db:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Convert to database string representation.
            pub fn as_db_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $db),+
                }
            }

            /// Parse from database string representation.
            pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
                let lowered = s.trim().to_lowercase();
                $(
                    if lowered == $db $(|| lowered == $alias)* {
                        return Ok($name::$variant);
                    }
                )+
                Err(EnumParseError::new($label, s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_db_str())
            }
        }

        impl FromStr for $name {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_db_str(s)
            }
        }
    };
}

// ============================================================================
// CASE KIND
// ============================================================================

/// Record kind tracked by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Complaint,
    Capa,
    Audit,
    Incident,
    Risk,
}

string_enum!(CaseKind, "case kind", {
    Complaint => "complaint" | "complaints",
    Capa => "capa" | "capas",
    Audit => "audit" | "audits",
    Incident => "incident" | "incidents",
    Risk => "risk" | "risks",
});

impl CaseKind {
    /// Id prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            CaseKind::Complaint => "CMP",
            CaseKind::Capa => "CAPA",
            CaseKind::Audit => "AUD",
            CaseKind::Incident => "INC",
            CaseKind::Risk => "RSK",
        }
    }

    /// Resolve a kind from an id prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        CaseKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.prefix() == prefix)
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Severity assigned at intake or triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

string_enum!(Severity, "severity", {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

/// Work priority. Derived from severity unless explicitly overridden.
/// Ordering puts `P1` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

string_enum!(Priority, "priority", {
    P1 => "p1",
    P2 => "p2",
    P3 => "p3",
    P4 => "p4",
});

/// Subject-matter category of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Safety,
    Quality,
    Regulatory,
    Environmental,
    Security,
    Operational,
    Other,
}

string_enum!(Category, "category", {
    Safety => "safety",
    Quality => "quality" | "product_quality",
    Regulatory => "regulatory" | "compliance",
    Environmental => "environmental",
    Security => "security",
    Operational => "operational" | "service",
    Other => "other",
});

// ============================================================================
// WORKFLOW PAYLOAD ENUMS
// ============================================================================

/// Outcome chosen when a case is triaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TriageDecision {
    /// Accept for investigation; requires an assignee.
    Accept,
    /// Reject outright; requires a reason.
    Reject,
    /// Keep at intake and request more information.
    Info,
    /// Jump straight to investigation and raise a linked incident.
    Escalate,
}

string_enum!(TriageDecision, "triage decision", {
    Accept => "accept",
    Reject => "reject",
    Info => "info" | "request_info",
    Escalate => "escalate",
});

/// Root cause analysis technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RcaMethod {
    FiveWhys,
    Fishbone,
    FaultTree,
    Pareto,
    Other,
}

string_enum!(RcaMethod, "rca method", {
    FiveWhys => "five_whys" | "5whys" | "5_whys",
    Fishbone => "fishbone" | "ishikawa",
    FaultTree => "fault_tree",
    Pareto => "pareto",
    Other => "other",
});

/// How a case was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ResolutionType {
    CorrectiveAction,
    Replacement,
    Refund,
    Explanation,
    ProcessChange,
    NoActionRequired,
}

string_enum!(ResolutionType, "resolution type", {
    CorrectiveAction => "corrective_action",
    Replacement => "replacement",
    Refund => "refund",
    Explanation => "explanation",
    ProcessChange => "process_change",
    NoActionRequired => "no_action_required" | "none",
});

/// Typed relation carried by a link between two cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// Target is the corrective/preventive action for the source.
    CorrectiveAction,
    /// Target was raised by escalating the source.
    Escalation,
    /// Target is the root cause of the source.
    RootCause,
    /// Target is a nonconformance report behind the source.
    Nonconformance,
    /// Target is a risk the source feeds into.
    RiskAssessment,
    /// Plain association.
    Related,
}

string_enum!(Relation, "relation", {
    CorrectiveAction => "correctiveaction" | "corrective_action",
    Escalation => "escalation",
    RootCause => "rootcause" | "root_cause",
    Nonconformance => "nonconformance" | "ncr",
    RiskAssessment => "riskassessment" | "risk_assessment",
    Related => "related" | "related_to",
});

// ============================================================================
// SLA STATUS
// ============================================================================

/// Live service-level status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Ok,
    Warning,
    Breached,
}

string_enum!(SlaStatus, "sla status", {
    Ok => "ok",
    Warning => "warning",
    Breached => "breached",
});
