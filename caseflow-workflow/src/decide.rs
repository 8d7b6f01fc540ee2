//! Pure command decision.
//!
//! `decide` looks at a case and a command and returns the field changes and
//! side effects the command implies, or the reason it must be refused. It
//! never touches storage, so a refused command cannot leave partial state.

use crate::transitions::{table_for, TransitionTable};
use crate::{Command, CommandName};
use caseflow_core::policy::{effective_priority, resolve_regulatory_flag};
use caseflow_core::{
    ActorId, Case, CaseField, CaseKind, CaseStatus, CaseflowError, EngineConfig, FieldDelta,
    FieldValue, NewCase, Phase, Relation, Timestamp, TriageDecision, ValidationError,
    WorkflowError,
};
use caseflow_storage::TrailNote;

/// Something the engine must do beyond updating the case's own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Open a new case and link it from this one.
    OpenLinked {
        kind: CaseKind,
        seed: NewCase,
        relation: Relation,
    },
    /// Link this case to an existing one.
    Link {
        target: caseflow_core::CaseId,
        relation: Relation,
    },
    /// Remove every link between this case and `target`.
    Unlink { target: caseflow_core::CaseId },
}

/// Outcome of a legal, well-formed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub command: CommandName,
    pub deltas: Vec<FieldDelta>,
    pub notes: Vec<TrailNote>,
    pub effects: Vec<SideEffect>,
}

impl Decision {
    fn new(command: CommandName) -> Self {
        Self {
            command,
            deltas: Vec::new(),
            notes: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn set(&mut self, field: CaseField, value: FieldValue) {
        self.deltas.push(FieldDelta::new(field, value));
    }

    fn status(&mut self, kind: CaseKind, phase: Phase) {
        self.set(
            CaseField::Status,
            FieldValue::Status(CaseStatus::for_phase(kind, phase)),
        );
    }

    fn note(&mut self, field: &str, value: String) {
        self.notes.push(TrailNote {
            field: field.to_string(),
            old_value: None,
            new_value: Some(value),
        });
    }

    /// Status the case will be in once applied.
    pub fn target_status(&self) -> Option<CaseStatus> {
        self.deltas.iter().rev().find_map(|d| match d.value {
            FieldValue::Status(s) if d.field == CaseField::Status => Some(s),
            _ => None,
        })
    }
}

fn required_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(trimmed.to_string())
}

fn required_opt_text(field: &str, value: Option<&String>) -> Result<String, ValidationError> {
    required_text(field, value.map(String::as_str).unwrap_or_default())
}

fn required_actor(field: &str, value: Option<&ActorId>) -> Result<ActorId, ValidationError> {
    value.cloned().ok_or_else(|| ValidationError::missing(field))
}

/// Refuse `command` for `case` as an illegal transition.
pub fn illegal(case: &Case, command: CommandName) -> WorkflowError {
    WorkflowError::IllegalTransition {
        case_id: case.id.clone(),
        current: case.status,
        command: command.to_string(),
        allowed: table_for(case.kind)
            .legal_commands(case.phase())
            .iter()
            .map(|c| c.to_string())
            .collect(),
    }
}

/// Decide what `command` does to `case`.
pub fn decide(
    case: &Case,
    command: &Command,
    actor: &ActorId,
    config: &EngineConfig,
    now: Timestamp,
) -> Result<Decision, CaseflowError> {
    let name = command.name();
    let table = table_for(case.kind);
    if !table.allows(case.phase(), name) {
        return Err(illegal(case, name).into());
    }

    let mut decision = Decision::new(name);
    let kind = case.kind;

    match command {
        Command::Triage(p) => {
            // Classification first so severity, priority and the regulatory
            // flag land in the same change set as the state move.
            decision.set(CaseField::Category, FieldValue::Category(p.category));
            decision.set(CaseField::Severity, FieldValue::Severity(p.severity));
            decision.set(
                CaseField::Priority,
                FieldValue::Priority(effective_priority(
                    p.severity,
                    case.priority,
                    case.priority_overridden,
                )),
            );
            decision.set(
                CaseField::RegulatoryFlag,
                FieldValue::Bool(resolve_regulatory_flag(
                    p.regulatory_flag,
                    case.regulatory_flag,
                    p.category,
                    p.severity,
                )),
            );
            triage(&mut decision, case, table, p, actor, now)?;
        }

        Command::Assign(p) => {
            decision.set(CaseField::Assignee, FieldValue::Actor(p.assignee.clone()));
            if case.phase() == Phase::Accepted {
                decision.status(kind, Phase::Investigating);
                decision.set(CaseField::InvestigationStartedAt, FieldValue::Time(now));
            }
        }

        Command::SubmitRca(p) => {
            let root_cause = required_text("rootCause", &p.root_cause)?;
            if p.capa_required && !table.capa_follow_up {
                return Err(ValidationError::invalid(
                    "capaRequired",
                    format!("a {} cannot spawn a follow-up CAPA", kind),
                )
                .into());
            }
            decision.set(CaseField::RootCause, FieldValue::Text(root_cause.clone()));
            decision.set(CaseField::RcaMethod, FieldValue::RcaMethod(p.method));
            decision.set(CaseField::Systemic, FieldValue::Bool(p.systemic));
            decision.set(CaseField::CapaRequired, FieldValue::Bool(p.capa_required));
            decision.set(CaseField::RcaSubmittedAt, FieldValue::Time(now));
            let next = if config.requires_rca_review(kind) {
                Phase::PendingRca
            } else {
                Phase::PendingResolution
            };
            decision.status(kind, next);

            if p.capa_required {
                let mut seed = NewCase::new(
                    format!("CAPA for {}: {}", case.id, case.title),
                    case.category,
                    case.severity,
                )
                .with_description(root_cause)
                .with_owner(actor.clone());
                seed.source = Some(case.id.to_string());
                decision.effects.push(SideEffect::OpenLinked {
                    kind: CaseKind::Capa,
                    seed,
                    relation: Relation::CorrectiveAction,
                });
            }
        }

        Command::ApproveRca(p) => {
            if p.approved {
                decision.set(CaseField::RcaApprovedAt, FieldValue::Time(now));
                decision.status(kind, Phase::PendingResolution);
            } else {
                let comment = required_opt_text("comment", p.comment.as_ref())?;
                decision.status(kind, Phase::Investigating);
                decision.note("rcaReview", format!("returned: {}", comment));
            }
        }

        Command::SubmitResolution(p) => {
            let message = required_text("customerMessage", &p.customer_message)?;
            decision.set(
                CaseField::ResolutionType,
                FieldValue::ResolutionType(p.resolution_type),
            );
            decision.set(CaseField::CustomerMessage, FieldValue::Text(message));
            decision.set(CaseField::ResolvedAt, FieldValue::Time(now));
            decision.status(kind, Phase::Resolved);
        }

        Command::Close(p) => {
            decision.set(CaseField::ClosedAt, FieldValue::Time(now));
            decision.status(kind, Phase::Closed);
            if let Some(comment) = p.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                decision.note("closeComment", comment.to_string());
            }
        }

        Command::LinkRecord(p) => {
            if p.id == case.id {
                return Err(ValidationError::invalid("id", "a case cannot link to itself").into());
            }
            if let Some(expected) = p.kind {
                if p.id.kind() != expected {
                    return Err(ValidationError::invalid(
                        "kind",
                        format!("{} is not a {}", p.id, expected),
                    )
                    .into());
                }
            }
            decision.effects.push(SideEffect::Link {
                target: p.id.clone(),
                relation: p.relation,
            });
        }

        Command::UnlinkRecord(p) => {
            decision.effects.push(SideEffect::Unlink {
                target: p.id.clone(),
            });
        }

        Command::ExtendSla(p) => {
            let reason = required_text("reason", &p.reason)?;
            if let Some(current) = case.sla_due_date {
                if p.new_due_date <= current {
                    return Err(ValidationError::invalid(
                        "newDueDate",
                        format!(
                            "{} is not later than the current due date {}",
                            p.new_due_date.to_rfc3339(),
                            current.to_rfc3339()
                        ),
                    )
                    .into());
                }
            }
            decision.set(CaseField::SlaDueDate, FieldValue::Time(p.new_due_date));
            decision.note("slaExtensionReason", reason);
        }

        Command::OverridePriority(p) => {
            let reason = required_text("reason", &p.reason)?;
            decision.set(CaseField::Priority, FieldValue::Priority(p.priority));
            decision.set(CaseField::PriorityOverridden, FieldValue::Bool(true));
            decision.note("priorityOverrideReason", reason);
        }

        Command::Archive(p) => {
            let reason = required_text("reason", &p.reason)?;
            decision.set(CaseField::ArchivedReason, FieldValue::Text(reason));
            decision.status(kind, Phase::Archived);
        }
    }

    Ok(decision)
}

fn triage(
    decision: &mut Decision,
    case: &Case,
    table: &TransitionTable,
    p: &crate::command::TriagePayload,
    actor: &ActorId,
    now: Timestamp,
) -> Result<(), ValidationError> {
    let kind = case.kind;
    match p.decision {
        TriageDecision::Accept => {
            let assignee = required_actor("assignee", p.assignee.as_ref())?;
            decision.set(CaseField::Assignee, FieldValue::Actor(assignee));
            decision.set(CaseField::AcknowledgedAt, FieldValue::Time(now));
            decision.status(kind, Phase::Accepted);
        }
        TriageDecision::Reject => {
            let reason = required_opt_text("reason", p.reason.as_ref())?;
            decision.set(CaseField::RejectionReason, FieldValue::Text(reason));
            decision.status(kind, Phase::Rejected);
        }
        TriageDecision::Info => {
            decision.set(
                CaseField::InfoRequestCount,
                FieldValue::Count(case.info_request_count.saturating_add(1)),
            );
            if let Some(reason) = p.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                decision.note("infoRequest", reason.to_string());
            }
        }
        TriageDecision::Escalate => {
            if !table.escalation {
                return Err(ValidationError::invalid(
                    "decision",
                    format!("a {} cannot be escalated", kind),
                ));
            }
            let assignee = required_actor("assignee", p.assignee.as_ref())?;
            decision.set(CaseField::Assignee, FieldValue::Actor(assignee));
            decision.set(CaseField::AcknowledgedAt, FieldValue::Time(now));
            decision.set(CaseField::InvestigationStartedAt, FieldValue::Time(now));
            decision.status(kind, Phase::Investigating);

            match &p.incident_id {
                Some(incident) if incident.kind() != CaseKind::Incident => {
                    return Err(ValidationError::invalid(
                        "incidentId",
                        format!("{} is not an incident", incident),
                    ));
                }
                Some(incident) => decision.effects.push(SideEffect::Link {
                    target: incident.clone(),
                    relation: Relation::Escalation,
                }),
                None => {
                    let mut seed = NewCase::new(
                        format!("Escalated from {}: {}", case.id, case.title),
                        p.category,
                        p.severity,
                    )
                    .with_owner(actor.clone());
                    seed.description = case.description.clone();
                    seed.source = Some(case.id.to_string());
                    seed.regulatory_flag = Some(resolve_regulatory_flag(
                        p.regulatory_flag,
                        case.regulatory_flag,
                        p.category,
                        p.severity,
                    ));
                    decision.effects.push(SideEffect::OpenLinked {
                        kind: CaseKind::Incident,
                        seed,
                        relation: Relation::Escalation,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::*;
    use caseflow_core::{CaseId, Category, ComplaintStatus, Priority, RcaMethod, Severity};
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn actor(name: &str) -> ActorId {
        ActorId::new(name).unwrap()
    }

    fn case(kind: CaseKind, phase: Phase) -> Case {
        let seed = NewCase::new("Noisy pump", Category::Quality, Severity::Medium);
        let mut case = Case::open(CaseId::new(kind, 2025, 1, 4), &seed, now(), now() + Duration::days(7));
        case.status = CaseStatus::for_phase(kind, phase);
        case
    }

    fn triage(decision: TriageDecision) -> TriagePayload {
        TriagePayload {
            decision,
            category: Category::Safety,
            severity: Severity::Critical,
            assignee: Some(actor("A")),
            reason: None,
            regulatory_flag: Some(false),
            incident_id: None,
        }
    }

    fn decide_default(case: &Case, command: &Command) -> Result<Decision, CaseflowError> {
        decide(case, command, &actor("lead"), &EngineConfig::default(), now())
    }

    #[test]
    fn test_illegal_command_reports_state_and_allowed() {
        let c = case(CaseKind::Complaint, Phase::Intake);
        let cmd = Command::SubmitResolution(SubmitResolutionPayload {
            resolution_type: caseflow_core::ResolutionType::Refund,
            customer_message: "Refunded".into(),
        });
        match decide_default(&c, &cmd) {
            Err(CaseflowError::Workflow(WorkflowError::IllegalTransition {
                current,
                command,
                allowed,
                ..
            })) => {
                assert_eq!(current, CaseStatus::Complaint(ComplaintStatus::New));
                assert_eq!(command, "submit_resolution");
                assert!(allowed.contains(&"triage".to_string()));
            }
            other => panic!("expected illegal transition, got {:?}", other),
        }
    }

    #[test]
    fn test_triage_accept_classifies_before_moving() {
        let c = case(CaseKind::Complaint, Phase::Intake);
        let d = decide_default(&c, &Command::Triage(triage(TriageDecision::Accept))).unwrap();
        let fields: Vec<_> = d.deltas.iter().map(|x| x.field).collect();
        let status_pos = fields.iter().position(|f| *f == CaseField::Status).unwrap();
        let severity_pos = fields.iter().position(|f| *f == CaseField::Severity).unwrap();
        assert!(severity_pos < status_pos);
        assert!(d.deltas.contains(&FieldDelta::new(
            CaseField::Priority,
            FieldValue::Priority(Priority::P1)
        )));
        // forced regardless of the requested false
        assert!(d.deltas.contains(&FieldDelta::new(
            CaseField::RegulatoryFlag,
            FieldValue::Bool(true)
        )));
        assert_eq!(
            d.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::Triaged))
        );
    }

    #[test]
    fn test_triage_accept_requires_assignee() {
        let c = case(CaseKind::Complaint, Phase::Intake);
        let mut p = triage(TriageDecision::Accept);
        p.assignee = None;
        assert!(matches!(
            decide_default(&c, &Command::Triage(p)),
            Err(CaseflowError::Validation(ValidationError::RequiredFieldMissing { .. }))
        ));
    }

    #[test]
    fn test_triage_reject_requires_reason() {
        let c = case(CaseKind::Complaint, Phase::Intake);
        let mut p = triage(TriageDecision::Reject);
        assert!(decide_default(&c, &Command::Triage(p.clone())).is_err());
        p.reason = Some("Duplicate of CMP-2025-0002".into());
        let d = decide_default(&c, &Command::Triage(p)).unwrap();
        assert_eq!(
            d.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::Rejected))
        );
    }

    #[test]
    fn test_triage_info_keeps_state() {
        let c = case(CaseKind::Complaint, Phase::Intake);
        let d = decide_default(&c, &Command::Triage(triage(TriageDecision::Info))).unwrap();
        assert_eq!(d.target_status(), None);
        assert!(d
            .deltas
            .contains(&FieldDelta::new(CaseField::InfoRequestCount, FieldValue::Count(1))));
    }

    #[test]
    fn test_escalation_per_kind() {
        let complaint = case(CaseKind::Complaint, Phase::Intake);
        let d = decide_default(&complaint, &Command::Triage(triage(TriageDecision::Escalate))).unwrap();
        assert!(matches!(
            d.effects.as_slice(),
            [SideEffect::OpenLinked {
                kind: CaseKind::Incident,
                relation: Relation::Escalation,
                ..
            }]
        ));

        let risk = case(CaseKind::Risk, Phase::Intake);
        assert!(matches!(
            decide_default(&risk, &Command::Triage(triage(TriageDecision::Escalate))),
            Err(CaseflowError::Validation(_))
        ));

        let mut p = triage(TriageDecision::Escalate);
        p.incident_id = Some(CaseId::new(CaseKind::Capa, 2025, 3, 4));
        assert!(decide_default(&complaint, &Command::Triage(p)).is_err());
    }

    #[test]
    fn test_assign_from_triaged_starts_investigation() {
        let c = case(CaseKind::Complaint, Phase::Accepted);
        let d = decide_default(&c, &Command::Assign(AssignPayload { assignee: actor("B") })).unwrap();
        assert_eq!(
            d.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::Investigating))
        );

        let c = case(CaseKind::Complaint, Phase::Investigating);
        let d = decide_default(&c, &Command::Assign(AssignPayload { assignee: actor("B") })).unwrap();
        assert_eq!(d.target_status(), None);
        assert_eq!(d.deltas.len(), 1);
    }

    #[test]
    fn test_submit_rca_review_gate() {
        let c = case(CaseKind::Complaint, Phase::Investigating);
        let cmd = Command::SubmitRca(SubmitRcaPayload {
            root_cause: "Seal supplier changed material".into(),
            method: RcaMethod::FiveWhys,
            systemic: true,
            capa_required: false,
        });
        let direct = decide_default(&c, &cmd).unwrap();
        assert_eq!(
            direct.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::PendingResolution))
        );

        let gated_config = EngineConfig::default().with_rca_review(CaseKind::Complaint);
        let gated = decide(&c, &cmd, &actor("lead"), &gated_config, now()).unwrap();
        assert_eq!(
            gated.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::PendingRca))
        );
    }

    #[test]
    fn test_submit_rca_validation() {
        let c = case(CaseKind::Complaint, Phase::Investigating);
        let blank = Command::SubmitRca(SubmitRcaPayload {
            root_cause: "   ".into(),
            method: RcaMethod::Fishbone,
            systemic: false,
            capa_required: false,
        });
        assert!(decide_default(&c, &blank).is_err());

        let capa = case(CaseKind::Capa, Phase::Investigating);
        let needs_capa = Command::SubmitRca(SubmitRcaPayload {
            root_cause: "Training gap".into(),
            method: RcaMethod::Fishbone,
            systemic: false,
            capa_required: true,
        });
        assert!(matches!(
            decide_default(&capa, &needs_capa),
            Err(CaseflowError::Validation(_))
        ));
        let d = decide_default(&c, &needs_capa).unwrap();
        assert_eq!(d.effects.len(), 1);
    }

    #[test]
    fn test_approve_rca_rework_needs_comment() {
        let c = case(CaseKind::Complaint, Phase::PendingRca);
        let reject = Command::ApproveRca(ApproveRcaPayload {
            approved: false,
            comment: None,
        });
        assert!(decide_default(&c, &reject).is_err());

        let rework = Command::ApproveRca(ApproveRcaPayload {
            approved: false,
            comment: Some("Dig deeper".into()),
        });
        let d = decide_default(&c, &rework).unwrap();
        assert_eq!(
            d.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::Investigating))
        );
        assert!(!d.deltas.iter().any(|x| x.field == CaseField::RcaApprovedAt));
    }

    #[test]
    fn test_extend_sla_must_move_later() {
        let c = case(CaseKind::Audit, Phase::Investigating);
        let due = c.sla_due_date.unwrap();
        let earlier = Command::ExtendSla(ExtendSlaPayload {
            new_due_date: due - Duration::days(1),
            reason: "Supplier delay".into(),
        });
        assert!(decide_default(&c, &earlier).is_err());

        let later = Command::ExtendSla(ExtendSlaPayload {
            new_due_date: due + Duration::days(3),
            reason: "  ".into(),
        });
        assert!(decide_default(&c, &later).is_err());
    }

    #[test]
    fn test_link_self_rejected() {
        let c = case(CaseKind::Complaint, Phase::Intake);
        let cmd = Command::LinkRecord(LinkRecordPayload {
            kind: None,
            id: c.id.clone(),
            relation: Relation::Related,
        });
        assert!(decide_default(&c, &cmd).is_err());
    }

    #[test]
    fn test_archive_from_terminal() {
        let c = case(CaseKind::Complaint, Phase::Closed);
        let cmd = Command::Archive(ArchivePayload {
            reason: "Retention period".into(),
        });
        let d = decide_default(&c, &cmd).unwrap();
        assert_eq!(
            d.target_status(),
            Some(CaseStatus::Complaint(ComplaintStatus::Archived))
        );

        let archived = case(CaseKind::Complaint, Phase::Archived);
        assert!(matches!(
            decide_default(&archived, &cmd),
            Err(CaseflowError::Workflow(WorkflowError::IllegalTransition { .. }))
        ));
    }
}
