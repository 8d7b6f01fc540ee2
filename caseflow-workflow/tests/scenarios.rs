//! End-to-end workflow scenarios against the in-memory engine.

use caseflow_core::{
    CaseFilter, CaseKind, CaseStatus, ComplaintStatus, EngineConfig, LinkDirection, Phase,
    Priority, RcaMethod, RecordType, Relation, ResolutionType, Severity, SlaStatus,
    TriageDecision,
};
use caseflow_test_utils::{assertions, fixtures};
use caseflow_workflow::{
    ApproveRcaPayload, ArchivePayload, AssignPayload, ClosePayload, Command, CommandEnvelope,
    CommandName, ExtendSlaPayload, LinkRecordPayload, OverridePriorityPayload, SubmitRcaPayload,
    SubmitResolutionPayload, TriagePayload, UnlinkRecordPayload, WorkflowEngine,
};
use chrono::Duration;
use std::sync::Arc;

fn engine_with(config: EngineConfig) -> (WorkflowEngine, Arc<caseflow_core::ManualClock>) {
    let clock = fixtures::clock();
    (WorkflowEngine::in_memory(config, clock.clone()), clock)
}

fn engine() -> (WorkflowEngine, Arc<caseflow_core::ManualClock>) {
    engine_with(EngineConfig::default())
}

fn send(actor: &str, command: Command) -> CommandEnvelope {
    CommandEnvelope::new(fixtures::actor(actor), command)
}

fn accept(assignee: &str) -> Command {
    Command::Triage(TriagePayload {
        decision: TriageDecision::Accept,
        category: caseflow_core::Category::Quality,
        severity: Severity::Medium,
        assignee: Some(fixtures::actor(assignee)),
        reason: None,
        regulatory_flag: None,
        incident_id: None,
    })
}

fn assign(assignee: &str) -> Command {
    Command::Assign(AssignPayload {
        assignee: fixtures::actor(assignee),
    })
}

fn rca(capa_required: bool) -> Command {
    Command::SubmitRca(SubmitRcaPayload {
        root_cause: "Worn gasket".into(),
        method: RcaMethod::FiveWhys,
        systemic: false,
        capa_required,
    })
}

fn resolve() -> Command {
    Command::SubmitResolution(SubmitResolutionPayload {
        resolution_type: ResolutionType::Replacement,
        customer_message: "A replacement unit is on its way".into(),
    })
}

fn close() -> Command {
    Command::Close(ClosePayload::default())
}

#[test]
fn test_critical_safety_complaint_forced_regulatory() {
    let (engine, _) = engine();
    let opened = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::safety_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap();

    let outcome = engine
        .execute(
            &opened.case.id,
            send(
                "lead",
                Command::Triage(TriagePayload {
                    decision: TriageDecision::Accept,
                    category: caseflow_core::Category::Safety,
                    severity: Severity::Critical,
                    assignee: Some(fixtures::actor("A")),
                    reason: None,
                    regulatory_flag: Some(false),
                    incident_id: None,
                }),
            ),
        )
        .unwrap();

    let case = &outcome.view.case;
    assert!(case.regulatory_flag);
    assert_eq!(case.priority, Priority::P1);
    assert_eq!(case.status, CaseStatus::Complaint(ComplaintStatus::Triaged));
    assert_eq!(case.assignee, Some(fixtures::actor("A")));
}

#[test]
fn test_full_lifecycle_sets_every_stage_timestamp() {
    let (engine, clock) = engine();
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;

    let steps = [accept("A"), assign("B"), rca(false), resolve(), close()];
    let mut last = None;
    for step in steps {
        clock.advance(Duration::hours(2));
        let outcome = engine.execute(&id, send("lead", step)).unwrap();
        assert!(!outcome.entries.is_empty(), "every step writes audit entries");
        last = Some(outcome);
    }

    let view = last.unwrap().view;
    let case = &view.case;
    assertions::assert_phase(case, Phase::Closed);
    assert!(case.acknowledged_at.is_some());
    assert!(case.investigation_started_at.is_some());
    assert!(case.rca_submitted_at.is_some());
    assert!(case.resolved_at.is_some());
    assert!(case.closed_at.is_some());
    assert!(case.acknowledged_at < case.closed_at);
    // frozen at resolution time, well inside the 7 day window
    assert_eq!(view.sla_status, Some(SlaStatus::Ok));

    let trail = engine.audit_trail(&id).unwrap();
    assert!(trail.len() >= 5);
    assertions::assert_trail_ordered(&trail);
    for field in [
        "acknowledgedAt",
        "investigationStartedAt",
        "rcaSubmittedAt",
        "resolvedAt",
        "closedAt",
    ] {
        assertions::assert_set_once(&trail, field);
    }
    let status_moves = trail
        .iter()
        .filter(|e| e.field.as_deref() == Some("status"))
        .count();
    // creation + five transitions
    assert_eq!(status_moves, 6);
}

#[test]
fn test_illegal_command_mutates_nothing() {
    let (engine, _) = engine();
    let view = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap();
    let id = view.case.id.clone();
    let before = engine.audit_trail(&id).unwrap().len();

    let result = engine.execute(&id, send("lead", resolve()));
    let allowed = assertions::assert_illegal_transition(&result, "submit_resolution");
    assert!(allowed.contains(&"triage".to_string()));
    match &result {
        Err(caseflow_core::CaseflowError::Workflow(
            caseflow_core::WorkflowError::IllegalTransition { current, .. },
        )) => assert_eq!(*current, CaseStatus::Complaint(ComplaintStatus::New)),
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(engine.view(&id).unwrap().case, view.case);
    assert_eq!(engine.audit_trail(&id).unwrap().len(), before);

    let rejections = engine.rejections(&id).unwrap();
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].command, "submit_resolution");
    assert_eq!(
        rejections[0].status,
        Some(CaseStatus::Complaint(ComplaintStatus::New))
    );
}

#[test]
fn test_link_is_visible_from_both_ends() {
    let (engine, _) = engine();
    let intake = fixtures::actor("intake");
    let complaint = engine
        .open_case(CaseKind::Complaint, &fixtures::quality_complaint(), &intake, None)
        .unwrap()
        .case
        .id;
    let capa = engine
        .open_case(CaseKind::Capa, &fixtures::seed("Replace gasket supplier"), &intake, None)
        .unwrap()
        .case
        .id;

    let link = Command::LinkRecord(LinkRecordPayload {
        kind: Some(CaseKind::Capa),
        id: capa.clone(),
        relation: Relation::CorrectiveAction,
    });
    let outcome = engine.execute(&complaint, send("lead", link.clone())).unwrap();
    assert_eq!(outcome.entries.len(), 1);
    assert_eq!(outcome.entries[0].field.as_deref(), Some("links"));

    let from_capa = engine.links_of(&capa).unwrap();
    assert_eq!(from_capa.len(), 1);
    assert_eq!(from_capa[0].other_id, complaint);
    assert_eq!(from_capa[0].direction, LinkDirection::Incoming);
    assert_eq!(from_capa[0].relation, Relation::CorrectiveAction);

    // the same link again changes nothing
    let again = engine.execute(&complaint, send("lead", link)).unwrap();
    assert!(again.entries.is_empty());
    assert_eq!(engine.links_of(&complaint).unwrap().len(), 1);

    engine
        .execute(
            &capa,
            send("lead", Command::UnlinkRecord(UnlinkRecordPayload { id: complaint.clone() })),
        )
        .unwrap();
    assert!(engine.links_of(&complaint).unwrap().is_empty());

    let missing = engine.execute(
        &capa,
        send("lead", Command::UnlinkRecord(UnlinkRecordPayload { id: complaint })),
    );
    assertions::assert_not_found(&missing, RecordType::Link);
}

#[test]
fn test_link_to_unknown_case_is_not_found() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    let ghost = caseflow_core::CaseId::new(CaseKind::Capa, 2025, 99, 4);
    let result = engine.execute(
        &id,
        send(
            "lead",
            Command::LinkRecord(LinkRecordPayload {
                kind: None,
                id: ghost,
                relation: Relation::Related,
            }),
        ),
    );
    assertions::assert_not_found(&result, RecordType::Case);
    assert_eq!(engine.rejections(&id).unwrap().len(), 1);
}

#[test]
fn test_reassign_is_audited_only_when_changed() {
    let (engine, clock) = engine();
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    engine.execute(&id, send("lead", accept("A"))).unwrap();
    let started = engine
        .execute(&id, send("lead", assign("A")))
        .unwrap()
        .view
        .case
        .investigation_started_at;
    assert!(started.is_some());

    clock.advance(Duration::hours(1));
    let same = engine.execute(&id, send("lead", assign("A"))).unwrap();
    assert!(same.entries.is_empty());
    assert_eq!(same.view.case.investigation_started_at, started);

    clock.advance(Duration::hours(1));
    let other = engine.execute(&id, send("lead", assign("B"))).unwrap();
    assert_eq!(other.entries.len(), 1);
    assert_eq!(other.entries[0].field.as_deref(), Some("assignee"));
    assert_eq!(other.view.case.investigation_started_at, started);
    assertions::assert_phase(&other.view.case, Phase::Investigating);
}

#[test]
fn test_resubmitted_command_id_is_a_no_op() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    let envelope = send("lead", accept("A"));

    let first = engine.execute(&id, envelope.clone()).unwrap();
    assert!(!first.replayed);
    let trail_len = engine.audit_trail(&id).unwrap().len();

    let second = engine.execute(&id, envelope).unwrap();
    assert!(second.replayed);
    assert!(second.entries.is_empty());
    assert_eq!(second.view.case, first.view.case);
    assert_eq!(engine.audit_trail(&id).unwrap().len(), trail_len);
}

#[test]
fn test_open_case_with_command_id_is_idempotent() {
    let (engine, _) = engine();
    let command_id = caseflow_core::new_command_id();
    let intake = fixtures::actor("intake");
    let seed = fixtures::quality_complaint();
    let first = engine
        .open_case(CaseKind::Complaint, &seed, &intake, Some(command_id))
        .unwrap();
    let second = engine
        .open_case(CaseKind::Complaint, &seed, &intake, Some(command_id))
        .unwrap();
    assert_eq!(first.case.id, second.case.id);
    assert_eq!(engine.list(&CaseFilter::default()).unwrap().len(), 1);
}

#[test]
fn test_escalation_opens_linked_incident() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;

    let outcome = engine
        .execute(
            &id,
            send(
                "lead",
                Command::Triage(TriagePayload {
                    decision: TriageDecision::Escalate,
                    category: caseflow_core::Category::Safety,
                    severity: Severity::High,
                    assignee: Some(fixtures::actor("A")),
                    reason: None,
                    regulatory_flag: None,
                    incident_id: None,
                }),
            ),
        )
        .unwrap();

    assertions::assert_phase(&outcome.view.case, Phase::Investigating);
    assert_eq!(outcome.spawned.len(), 1);
    let incident = &outcome.spawned[0];
    assert_eq!(incident.kind(), CaseKind::Incident);
    assert_eq!(outcome.view.links.len(), 1);
    assert_eq!(outcome.view.links[0].relation, Relation::Escalation);

    let back = engine.links_of(incident).unwrap();
    assert_eq!(back[0].other_id, id);
    let incident_case = engine.view(incident).unwrap().case;
    assertions::assert_phase(&incident_case, Phase::Intake);
    assert_eq!(incident_case.source.as_deref(), Some(id.as_str()));
}

#[test]
fn test_capa_cannot_be_escalated_or_spawn_capa() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Capa,
            &fixtures::seed("Tighten torque limits"),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;

    let escalate = engine.execute(
        &id,
        send(
            "lead",
            Command::Triage(TriagePayload {
                decision: TriageDecision::Escalate,
                category: caseflow_core::Category::Quality,
                severity: Severity::Low,
                assignee: Some(fixtures::actor("A")),
                reason: None,
                regulatory_flag: None,
                incident_id: None,
            }),
        ),
    );
    assertions::assert_validation_error(&escalate);

    engine.execute(&id, send("lead", accept("A"))).unwrap();
    engine.execute(&id, send("lead", assign("A"))).unwrap();
    let spawn = engine.execute(&id, send("lead", rca(true)));
    assertions::assert_validation_error(&spawn);
    assertions::assert_phase(&engine.view(&id).unwrap().case, Phase::Investigating);
}

#[test]
fn test_rca_requiring_capa_opens_follow_up() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Incident,
            &fixtures::seed("Forklift near miss"),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    engine.execute(&id, send("lead", accept("A"))).unwrap();
    engine.execute(&id, send("lead", assign("A"))).unwrap();
    let outcome = engine.execute(&id, send("A", rca(true))).unwrap();

    assert_eq!(outcome.spawned.len(), 1);
    assert_eq!(outcome.spawned[0].kind(), CaseKind::Capa);
    assert_eq!(outcome.view.links[0].relation, Relation::CorrectiveAction);
    assertions::assert_phase(&outcome.view.case, Phase::PendingResolution);
}

#[test]
fn test_rca_review_gate() {
    let config = EngineConfig::default().with_rca_review(CaseKind::Complaint);
    let (engine, _) = engine_with(config);
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    engine.execute(&id, send("lead", accept("A"))).unwrap();
    engine.execute(&id, send("lead", assign("A"))).unwrap();
    let pending = engine.execute(&id, send("A", rca(false))).unwrap();
    assertions::assert_phase(&pending.view.case, Phase::PendingRca);
    assert_eq!(
        engine.legal_commands(&id).unwrap().first(),
        Some(&CommandName::Assign)
    );

    let returned = engine
        .execute(
            &id,
            send(
                "lead",
                Command::ApproveRca(ApproveRcaPayload {
                    approved: false,
                    comment: Some("Check the supplier batch too".into()),
                }),
            ),
        )
        .unwrap();
    assertions::assert_phase(&returned.view.case, Phase::Investigating);
    assert!(returned.view.case.rca_approved_at.is_none());

    engine.execute(&id, send("A", rca(false))).unwrap();
    let approved = engine
        .execute(
            &id,
            send(
                "lead",
                Command::ApproveRca(ApproveRcaPayload {
                    approved: true,
                    comment: None,
                }),
            ),
        )
        .unwrap();
    assertions::assert_phase(&approved.view.case, Phase::PendingResolution);
    assert!(approved.view.case.rca_approved_at.is_some());

    // first submission time is kept
    let trail = engine.audit_trail(&id).unwrap();
    assertions::assert_set_once(&trail, "rcaSubmittedAt");
}

#[test]
fn test_extend_sla_and_override_priority() {
    let (engine, clock) = engine();
    let view = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap();
    let id = view.case.id.clone();
    let due = view.case.sla_due_date.unwrap();

    clock.advance(Duration::days(6) + Duration::hours(12));
    assert_eq!(engine.view(&id).unwrap().sla_status, Some(SlaStatus::Warning));

    let earlier = engine.execute(
        &id,
        send(
            "lead",
            Command::ExtendSla(ExtendSlaPayload {
                new_due_date: due - Duration::hours(1),
                reason: "Waiting on lab".into(),
            }),
        ),
    );
    assertions::assert_validation_error(&earlier);

    let extended = engine
        .execute(
            &id,
            send(
                "lead",
                Command::ExtendSla(ExtendSlaPayload {
                    new_due_date: due + Duration::days(7),
                    reason: "Waiting on lab".into(),
                }),
            ),
        )
        .unwrap();
    assert_eq!(extended.view.sla_status, Some(SlaStatus::Ok));
    assert_eq!(extended.view.case.sla_due_date, Some(due + Duration::days(7)));

    let overridden = engine
        .execute(
            &id,
            send(
                "lead",
                Command::OverridePriority(OverridePriorityPayload {
                    priority: Priority::P1,
                    reason: "Key account".into(),
                }),
            ),
        )
        .unwrap();
    assert!(overridden.view.case.priority_overridden);

    // a later triage keeps the override
    let triaged = engine
        .execute(&id, send("lead", accept("A")))
        .unwrap()
        .view
        .case;
    assert_eq!(triaged.priority, Priority::P1);
}

#[test]
fn test_archive_is_terminal_and_keeps_history() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Risk,
            &fixtures::seed("Single-source resin"),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    let before = engine.audit_trail(&id).unwrap().len();
    let archived = engine
        .execute(
            &id,
            send(
                "lead",
                Command::Archive(ArchivePayload {
                    reason: "Duplicate".into(),
                }),
            ),
        )
        .unwrap();
    assertions::assert_phase(&archived.view.case, Phase::Archived);
    assert_eq!(archived.view.sla_status, None);
    assert!(engine.audit_trail(&id).unwrap().len() > before);
    assert!(engine.legal_commands(&id).unwrap().is_empty());

    let again = engine.execute(
        &id,
        send(
            "lead",
            Command::Archive(ArchivePayload {
                reason: "Duplicate".into(),
            }),
        ),
    );
    assertions::assert_illegal_transition(&again, "archive");
    assert!(engine.list(&CaseFilter::default()).unwrap().is_empty());
}

#[test]
fn test_inbox_follows_the_case() {
    let (engine, _) = engine();
    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    let lead = fixtures::actor("quality.lead");
    let inbox = engine.inbox(&lead).unwrap();
    assert_eq!(inbox.action_items.len(), 1);
    assert_eq!(inbox.action_items[0].next_command, CommandName::Triage);

    engine.execute(&id, send("quality.lead", accept("A"))).unwrap();
    assert!(engine.inbox(&lead).unwrap().action_items.is_empty());
    let a = engine.inbox(&fixtures::actor("A")).unwrap();
    assert_eq!(a.action_items[0].case_id, id);
    assert_eq!(a.action_items[0].next_command, CommandName::Assign);
}

#[test]
fn test_unknown_case_is_not_found() {
    let (engine, _) = engine();
    let ghost = caseflow_core::CaseId::new(CaseKind::Audit, 2025, 7, 4);
    assertions::assert_not_found(&engine.view(&ghost), RecordType::Case);
    assertions::assert_not_found(
        &engine.execute(&ghost, send("lead", close())),
        RecordType::Case,
    );
}

#[test]
fn test_commands_on_unknown_cases_take_no_lock() {
    let (engine, _) = engine();
    for seq in 1..=50 {
        let ghost = caseflow_core::CaseId::new(CaseKind::Complaint, 2025, seq, 4);
        assertions::assert_not_found(
            &engine.execute(&ghost, send("lead", close())),
            RecordType::Case,
        );
    }
    assert_eq!(engine.lock_count(), 0);

    let id = engine
        .open_case(
            CaseKind::Complaint,
            &fixtures::quality_complaint(),
            &fixtures::actor("intake"),
            None,
        )
        .unwrap()
        .case
        .id;
    engine.execute(&id, send("lead", accept("A"))).unwrap();
    engine.execute(&id, send("lead", assign("B"))).unwrap();
    assert_eq!(engine.lock_count(), 1);
}
