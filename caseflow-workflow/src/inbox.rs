//! Action items and notifications, derived from case state and ownership.
//!
//! Nothing here is stored. Every call projects the current cases again.

use crate::CommandName;
use caseflow_core::{
    ActorId, Case, CaseFilter, CaseId, CaseKind, CaseStatus, CaseflowResult, EngineConfig, Phase,
    Priority, SlaStatus, Timestamp,
};
use caseflow_storage::CaseStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Something `actor` has to do next on a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub case_id: CaseId,
    pub kind: CaseKind,
    pub title: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub status: CaseStatus,
    pub next_command: CommandName,
    pub priority: Priority,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due: Option<Timestamp>,
    pub sla_status: Option<SlaStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SlaWarning,
    SlaBreached,
    /// Regulatory case that has not reached resolution yet.
    RegulatoryAttention,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub case_id: CaseId,
    pub kind: NotificationKind,
    pub priority: Priority,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub due: Option<Timestamp>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct InboxView {
    pub action_items: Vec<ActionItem>,
    pub notifications: Vec<Notification>,
}

/// The command that moves a case forward from `phase`, if any.
pub fn next_command(phase: Phase) -> Option<CommandName> {
    match phase {
        Phase::Intake => Some(CommandName::Triage),
        Phase::Accepted => Some(CommandName::Assign),
        Phase::Investigating => Some(CommandName::SubmitRca),
        Phase::PendingRca => Some(CommandName::ApproveRca),
        Phase::PendingResolution => Some(CommandName::SubmitResolution),
        Phase::Resolved => Some(CommandName::Close),
        Phase::Closed | Phase::Rejected | Phase::Archived => None,
    }
}

/// Who is expected to act on `case` next.
///
/// Work phases belong to the assignee; gate phases (triage, RCA review,
/// close) belong to the owner. Either falls back to the other.
pub fn responsible(case: &Case) -> Option<&ActorId> {
    match case.phase() {
        Phase::Accepted | Phase::Investigating | Phase::PendingResolution => {
            case.assignee.as_ref().or(case.owner.as_ref())
        }
        _ => case.owner.as_ref().or(case.assignee.as_ref()),
    }
}

fn involves(case: &Case, actor: &ActorId) -> bool {
    case.owner.as_ref() == Some(actor) || case.assignee.as_ref() == Some(actor)
}

/// Read-only projection over a case store.
pub struct Inbox {
    cases: Arc<dyn CaseStore>,
    config: EngineConfig,
}

impl Inbox {
    pub fn new(cases: Arc<dyn CaseStore>, config: EngineConfig) -> Self {
        Self { cases, config }
    }

    pub fn for_actor(&self, actor: &ActorId, now: Timestamp) -> CaseflowResult<InboxView> {
        let window = self.config.sla_warning_window()?;
        let mut view = InboxView::default();

        for case in self.cases.list(&CaseFilter::default())? {
            if !involves(&case, actor) {
                continue;
            }
            // A case with broken SLA data is left out here and reported
            // through its own view.
            let sla_status = match case.sla_status(now, window) {
                Ok(status) => status,
                Err(err) => {
                    warn!(case_id = %case.id, error = %err, "case skipped in inbox");
                    continue;
                }
            };

            if let Some(next) = next_command(case.phase()) {
                if responsible(&case) == Some(actor) {
                    view.action_items.push(ActionItem {
                        case_id: case.id.clone(),
                        kind: case.kind,
                        title: case.title.clone(),
                        status: case.status,
                        next_command: next,
                        priority: case.priority,
                        due: case.sla_due_date,
                        sla_status,
                    });
                }
            }

            let notify = |kind: NotificationKind, message: String| Notification {
                case_id: case.id.clone(),
                kind,
                priority: case.priority,
                due: case.sla_due_date,
                message,
            };
            match sla_status {
                Some(SlaStatus::Breached) => view.notifications.push(notify(
                    NotificationKind::SlaBreached,
                    format!("{} is past its SLA due date", case.id),
                )),
                Some(SlaStatus::Warning) => view.notifications.push(notify(
                    NotificationKind::SlaWarning,
                    format!("{} is due soon", case.id),
                )),
                _ => {}
            }
            if case.regulatory_flag && case.phase() < Phase::Resolved {
                view.notifications.push(notify(
                    NotificationKind::RegulatoryAttention,
                    format!("{} is regulatory and awaiting {}", case.id, case.status),
                ));
            }
        }

        view.action_items
            .sort_by(|a, b| (a.priority, a.due, &a.case_id).cmp(&(b.priority, b.due, &b.case_id)));
        view.notifications
            .sort_by(|a, b| (a.priority, a.due, &a.case_id).cmp(&(b.priority, b.due, &b.case_id)));
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::{CaseField, Category, FieldValue, NewCase, Severity};
    use caseflow_storage::{ChangeContext, ChangeSet, InMemoryAuditLog, InMemoryCaseStore};
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn actor(name: &str) -> ActorId {
        ActorId::new(name).unwrap()
    }

    /// Serves a fixed set of cases, integrity checks or not.
    struct FixedStore(Vec<Case>);

    impl CaseStore for FixedStore {
        fn create(&self, _: CaseKind, _: &NewCase, _: &ChangeContext) -> CaseflowResult<Case> {
            unreachable!("read-only")
        }

        fn get(&self, id: &CaseId) -> CaseflowResult<Case> {
            self.0
                .iter()
                .find(|c| &c.id == id)
                .cloned()
                .ok_or_else(|| caseflow_core::StorageError::case_not_found(id).into())
        }

        fn apply(
            &self,
            _: &CaseId,
            _: u64,
            _: ChangeSet,
        ) -> CaseflowResult<caseflow_storage::Applied> {
            unreachable!("read-only")
        }

        fn list(&self, _: &CaseFilter) -> CaseflowResult<Vec<Case>> {
            Ok(self.0.clone())
        }
    }

    fn store() -> Arc<InMemoryCaseStore> {
        Arc::new(InMemoryCaseStore::new(
            Arc::new(InMemoryAuditLog::new()),
            EngineConfig::default(),
        ))
    }

    fn open(store: &InMemoryCaseStore, title: &str, severity: Severity, owner: &str) -> Case {
        let seed = NewCase::new(title, Category::Quality, severity).with_owner(actor(owner));
        let ctx = ChangeContext::new("open_case", actor(owner), t0());
        store.create(CaseKind::Complaint, &seed, &ctx).unwrap()
    }

    #[test]
    fn test_owner_gets_triage_items_sorted_by_priority() {
        let store = store();
        open(&store, "minor", Severity::Low, "olivia");
        open(&store, "major", Severity::Critical, "olivia");
        open(&store, "someone else", Severity::High, "sam");

        let inbox = Inbox::new(store, EngineConfig::default());
        let view = inbox.for_actor(&actor("olivia"), t0()).unwrap();

        let titles: Vec<_> = view.action_items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["major", "minor"]);
        assert!(view
            .action_items
            .iter()
            .all(|i| i.next_command == CommandName::Triage));
    }

    #[test]
    fn test_assignee_owns_work_phases() {
        let store = store();
        let case = open(&store, "leak", Severity::Medium, "olivia");
        let mut changes = ChangeSet::new(ChangeContext::new("triage", actor("olivia"), t0()));
        changes.deltas = vec![
            caseflow_core::FieldDelta::new(CaseField::Assignee, FieldValue::Actor(actor("ash"))),
            caseflow_core::FieldDelta::new(
                CaseField::Status,
                FieldValue::Status(CaseStatus::for_phase(CaseKind::Complaint, Phase::Accepted)),
            ),
        ];
        store.apply(&case.id, case.version, changes).unwrap();

        let inbox = Inbox::new(store, EngineConfig::default());
        let ash = inbox.for_actor(&actor("ash"), t0()).unwrap();
        assert_eq!(ash.action_items.len(), 1);
        assert_eq!(ash.action_items[0].next_command, CommandName::Assign);
        assert!(inbox
            .for_actor(&actor("olivia"), t0())
            .unwrap()
            .action_items
            .is_empty());
    }

    #[test]
    fn test_sla_and_regulatory_notifications() {
        let store = store();
        let seed = NewCase::new("burn hazard", Category::Safety, Severity::Critical)
            .with_owner(actor("olivia"));
        let ctx = ChangeContext::new("open_case", actor("olivia"), t0());
        store.create(CaseKind::Complaint, &seed, &ctx).unwrap();

        let inbox = Inbox::new(store, EngineConfig::default());
        let early = inbox.for_actor(&actor("olivia"), t0()).unwrap();
        let kinds: Vec<_> = early.notifications.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::RegulatoryAttention]);

        let late = inbox
            .for_actor(&actor("olivia"), t0() + Duration::days(8))
            .unwrap();
        assert!(late
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::SlaBreached));

        let soon = inbox
            .for_actor(&actor("olivia"), t0() + Duration::days(6) + Duration::hours(1))
            .unwrap();
        assert!(soon
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::SlaWarning));
    }

    #[test]
    fn test_next_command_covers_non_terminal_phases() {
        for phase in Phase::ALL {
            assert_eq!(next_command(*phase).is_none(), phase.is_terminal());
        }
    }

    #[test]
    fn test_case_without_due_date_is_skipped() {
        let seed = NewCase::new("broken", Category::Quality, Severity::High).with_owner(actor("olivia"));
        let mut broken = Case::open(
            CaseId::new(CaseKind::Complaint, 2025, 1, 4),
            &seed,
            t0(),
            t0() + Duration::days(7),
        );
        broken.sla_due_date = None;
        let healthy = Case::open(
            CaseId::new(CaseKind::Complaint, 2025, 2, 4),
            &seed,
            t0(),
            t0() + Duration::days(7),
        );

        let inbox = Inbox::new(Arc::new(FixedStore(vec![broken, healthy])), EngineConfig::default());
        let view = inbox.for_actor(&actor("olivia"), t0()).unwrap();
        assert_eq!(view.action_items.len(), 1);
        assert_eq!(view.action_items[0].case_id.as_str(), "CMP-2025-0002");
    }
}
