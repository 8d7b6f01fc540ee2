//! Per-kind case status enums.
//!
//! Every kind owns a closed status enum with its own labels. All five share
//! one lifecycle skeleton, expressed as [`Phase`]:
//!
//! ```text
//! Intake ──→ Accepted ──→ Investigating ──┬──→ PendingRca ──→ PendingResolution ──→ Resolved ──→ Closed
//!   │  ╲                      ↑           └────────────────────↗
//!   │   ╲── (escalate) ───────┘
//!   └──┴──→ Rejected (terminal)            any non-archived ──→ Archived (terminal)
//! ```
//!
//! [`CaseStatus`] is the tagged union stored on a case. A status of one kind
//! cannot be attached to a case of another kind.

use crate::{CaseKind, EnumParseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical lifecycle position shared by all kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intake,
    Accepted,
    Investigating,
    PendingRca,
    PendingResolution,
    Resolved,
    Closed,
    Rejected,
    Archived,
}

impl Phase {
    pub const ALL: &'static [Phase] = &[
        Phase::Intake,
        Phase::Accepted,
        Phase::Investigating,
        Phase::PendingRca,
        Phase::PendingResolution,
        Phase::Resolved,
        Phase::Closed,
        Phase::Rejected,
        Phase::Archived,
    ];

    /// No command other than `Archive` leaves a terminal phase, and nothing
    /// leaves `Archived`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Closed | Phase::Rejected | Phase::Archived)
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            Phase::Intake => "intake",
            Phase::Accepted => "accepted",
            Phase::Investigating => "investigating",
            Phase::PendingRca => "pending_rca",
            Phase::PendingResolution => "pending_resolution",
            Phase::Resolved => "resolved",
            Phase::Closed => "closed",
            Phase::Rejected => "rejected",
            Phase::Archived => "archived",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Declares a kind's status enum with a one-to-one mapping onto [`Phase`].
macro_rules! kind_status {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $phase:ident, $db:literal;)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn phase(&self) -> Phase {
                match self {
                    $($name::$variant => Phase::$phase),+
                }
            }

            pub fn from_phase(phase: Phase) -> Self {
                match phase {
                    $(Phase::$phase => $name::$variant),+
                }
            }

            pub fn as_db_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $db),+
                }
            }

            pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
                let lowered = s.trim().to_lowercase();
                $(
                    if lowered == $db {
                        return Ok($name::$variant);
                    }
                )+
                Err(EnumParseError {
                    type_name: stringify!($name),
                    value: s.to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_db_str())
            }
        }
    };
}

kind_status!(
    /// Customer or field complaint lifecycle.
    ComplaintStatus {
        New => Intake, "new";
        Triaged => Accepted, "triaged";
        Investigating => Investigating, "investigating";
        PendingRca => PendingRca, "pending_rca";
        PendingResolution => PendingResolution, "pending_resolution";
        Resolved => Resolved, "resolved";
        Closed => Closed, "closed";
        Rejected => Rejected, "rejected";
        Archived => Archived, "archived";
    }
);

kind_status!(
    /// Corrective and preventive action lifecycle.
    CapaStatus {
        Draft => Intake, "draft";
        Approved => Accepted, "approved";
        Implementation => Investigating, "implementation";
        RootCauseReview => PendingRca, "root_cause_review";
        EffectivenessCheck => PendingResolution, "effectiveness_check";
        Verified => Resolved, "verified";
        Closed => Closed, "closed";
        Cancelled => Rejected, "cancelled";
        Archived => Archived, "archived";
    }
);

kind_status!(
    /// Internal or supplier audit lifecycle.
    AuditStatus {
        Planned => Intake, "planned";
        Scheduled => Accepted, "scheduled";
        Fieldwork => Investigating, "fieldwork";
        FindingsReview => PendingRca, "findings_review";
        ReportDraft => PendingResolution, "report_draft";
        ReportIssued => Resolved, "report_issued";
        Closed => Closed, "closed";
        Cancelled => Rejected, "cancelled";
        Archived => Archived, "archived";
    }
);

kind_status!(
    /// Safety or quality incident lifecycle.
    IncidentStatus {
        Reported => Intake, "reported";
        Acknowledged => Accepted, "acknowledged";
        Investigating => Investigating, "investigating";
        RootCauseReview => PendingRca, "root_cause_review";
        Remediation => PendingResolution, "remediation";
        Mitigated => Resolved, "mitigated";
        Closed => Closed, "closed";
        Dismissed => Rejected, "dismissed";
        Archived => Archived, "archived";
    }
);

kind_status!(
    /// Risk register entry lifecycle.
    RiskStatus {
        Identified => Intake, "identified";
        Assessed => Accepted, "assessed";
        Treatment => Investigating, "treatment";
        TreatmentReview => PendingRca, "treatment_review";
        Monitoring => PendingResolution, "monitoring";
        Controlled => Resolved, "controlled";
        Closed => Closed, "closed";
        Withdrawn => Rejected, "withdrawn";
        Archived => Archived, "archived";
    }
);

// ============================================================================
// CASE STATUS UNION
// ============================================================================

/// Status of a case, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum CaseStatus {
    Complaint(ComplaintStatus),
    Capa(CapaStatus),
    Audit(AuditStatus),
    Incident(IncidentStatus),
    Risk(RiskStatus),
}

impl CaseStatus {
    /// Status a freshly opened case of `kind` starts in.
    pub fn initial(kind: CaseKind) -> Self {
        Self::for_phase(kind, Phase::Intake)
    }

    /// The status of `kind` sitting at `phase`.
    pub fn for_phase(kind: CaseKind, phase: Phase) -> Self {
        match kind {
            CaseKind::Complaint => CaseStatus::Complaint(ComplaintStatus::from_phase(phase)),
            CaseKind::Capa => CaseStatus::Capa(CapaStatus::from_phase(phase)),
            CaseKind::Audit => CaseStatus::Audit(AuditStatus::from_phase(phase)),
            CaseKind::Incident => CaseStatus::Incident(IncidentStatus::from_phase(phase)),
            CaseKind::Risk => CaseStatus::Risk(RiskStatus::from_phase(phase)),
        }
    }

    pub fn kind(&self) -> CaseKind {
        match self {
            CaseStatus::Complaint(_) => CaseKind::Complaint,
            CaseStatus::Capa(_) => CaseKind::Capa,
            CaseStatus::Audit(_) => CaseKind::Audit,
            CaseStatus::Incident(_) => CaseKind::Incident,
            CaseStatus::Risk(_) => CaseKind::Risk,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            CaseStatus::Complaint(s) => s.phase(),
            CaseStatus::Capa(s) => s.phase(),
            CaseStatus::Audit(s) => s.phase(),
            CaseStatus::Incident(s) => s.phase(),
            CaseStatus::Risk(s) => s.phase(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Kind-specific label, e.g. `pending_rca` or `effectiveness_check`.
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Complaint(s) => s.as_db_str(),
            CaseStatus::Capa(s) => s.as_db_str(),
            CaseStatus::Audit(s) => s.as_db_str(),
            CaseStatus::Incident(s) => s.as_db_str(),
            CaseStatus::Risk(s) => s.as_db_str(),
        }
    }

    /// Parse a kind-specific label.
    pub fn parse(kind: CaseKind, label: &str) -> Result<Self, EnumParseError> {
        Ok(match kind {
            CaseKind::Complaint => CaseStatus::Complaint(ComplaintStatus::from_db_str(label)?),
            CaseKind::Capa => CaseStatus::Capa(CapaStatus::from_db_str(label)?),
            CaseKind::Audit => CaseStatus::Audit(AuditStatus::from_db_str(label)?),
            CaseKind::Incident => CaseStatus::Incident(IncidentStatus::from_db_str(label)?),
            CaseKind::Risk => CaseStatus::Risk(RiskStatus::from_db_str(label)?),
        })
    }

    /// Every declared status of `kind`.
    pub fn all_for(kind: CaseKind) -> Vec<CaseStatus> {
        Phase::ALL
            .iter()
            .map(|phase| CaseStatus::for_phase(kind, *phase))
            .collect()
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
