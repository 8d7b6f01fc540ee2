//! Per-kind transition tables.
//!
//! Legality is data: each kind has a table listing, per command, the phases
//! it may be issued from. The five kinds share one rule set and differ only
//! in the flags on their table.

use crate::CommandName;
use caseflow_core::{CaseKind, CaseStatus, Phase};

const ACTIVE: &[Phase] = &[
    Phase::Intake,
    Phase::Accepted,
    Phase::Investigating,
    Phase::PendingRca,
    Phase::PendingResolution,
    Phase::Resolved,
];

const NOT_ARCHIVED: &[Phase] = &[
    Phase::Intake,
    Phase::Accepted,
    Phase::Investigating,
    Phase::PendingRca,
    Phase::PendingResolution,
    Phase::Resolved,
    Phase::Closed,
    Phase::Rejected,
];

/// Phases a command may be issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub command: CommandName,
    pub from: &'static [Phase],
}

const RULES: &[Rule] = &[
    Rule {
        command: CommandName::Triage,
        from: &[Phase::Intake],
    },
    Rule {
        command: CommandName::Assign,
        from: &[
            Phase::Accepted,
            Phase::Investigating,
            Phase::PendingRca,
            Phase::PendingResolution,
        ],
    },
    Rule {
        command: CommandName::SubmitRca,
        from: &[Phase::Investigating],
    },
    Rule {
        command: CommandName::ApproveRca,
        from: &[Phase::PendingRca],
    },
    Rule {
        command: CommandName::SubmitResolution,
        from: &[Phase::PendingResolution],
    },
    Rule {
        command: CommandName::Close,
        from: &[Phase::Resolved],
    },
    Rule {
        command: CommandName::LinkRecord,
        from: ACTIVE,
    },
    Rule {
        command: CommandName::UnlinkRecord,
        from: ACTIVE,
    },
    Rule {
        command: CommandName::ExtendSla,
        from: ACTIVE,
    },
    Rule {
        command: CommandName::OverridePriority,
        from: ACTIVE,
    },
    Rule {
        command: CommandName::Archive,
        from: NOT_ARCHIVED,
    },
];

/// Transition table for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTable {
    pub kind: CaseKind,
    pub rules: &'static [Rule],
    /// Triage may escalate straight to investigation with a linked incident.
    pub escalation: bool,
    /// An RCA may request a follow-up CAPA.
    pub capa_follow_up: bool,
}

static COMPLAINT: TransitionTable = TransitionTable {
    kind: CaseKind::Complaint,
    rules: RULES,
    escalation: true,
    capa_follow_up: true,
};

static CAPA: TransitionTable = TransitionTable {
    kind: CaseKind::Capa,
    rules: RULES,
    escalation: false,
    capa_follow_up: false,
};

static AUDIT: TransitionTable = TransitionTable {
    kind: CaseKind::Audit,
    rules: RULES,
    escalation: true,
    capa_follow_up: true,
};

static INCIDENT: TransitionTable = TransitionTable {
    kind: CaseKind::Incident,
    rules: RULES,
    escalation: false,
    capa_follow_up: true,
};

static RISK: TransitionTable = TransitionTable {
    kind: CaseKind::Risk,
    rules: RULES,
    escalation: false,
    capa_follow_up: true,
};

/// Table for `kind`.
pub fn table_for(kind: CaseKind) -> &'static TransitionTable {
    match kind {
        CaseKind::Complaint => &COMPLAINT,
        CaseKind::Capa => &CAPA,
        CaseKind::Audit => &AUDIT,
        CaseKind::Incident => &INCIDENT,
        CaseKind::Risk => &RISK,
    }
}

impl TransitionTable {
    pub fn allows(&self, phase: Phase, command: CommandName) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.command == command && rule.from.contains(&phase))
    }

    /// Commands legal in `phase`, in declaration order.
    pub fn legal_commands(&self, phase: Phase) -> Vec<CommandName> {
        self.rules
            .iter()
            .filter(|rule| rule.from.contains(&phase))
            .map(|rule| rule.command)
            .collect()
    }
}

/// Commands legal for a case in `status`.
pub fn legal_commands(status: CaseStatus) -> Vec<CommandName> {
    table_for(status.kind()).legal_commands(status.phase())
}

pub fn is_legal(status: CaseStatus, command: CommandName) -> bool {
    table_for(status.kind()).allows(status.phase(), command)
}
