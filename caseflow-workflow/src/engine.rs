//! Workflow engine: executes commands against the stores.
//!
//! Each command on a case runs under that case's lock: read, decide, write.
//! Commands on different cases only share the store locks for the short
//! write itself.

use crate::decide::{decide, Decision, SideEffect};
use crate::inbox::{Inbox, InboxView};
use crate::{CommandEnvelope, CommandName};
use caseflow_core::{
    ActorId, AuditEntry, Case, CaseFilter, CaseId, CaseKind, CaseView, CaseflowError,
    CaseflowResult, Clock, CommandId, EngineConfig, Link, LinkRef, NewCase, RecordType,
    RejectedCommand, Relation, StorageError, SystemClock, Timestamp,
};
use caseflow_storage::{
    AuditLog, AuditTrail, CaseStore, ChangeContext, ChangeSet, InMemoryAuditLog,
    InMemoryCaseStore, InMemoryLinkGraph, LinkGraph, TrailNote,
};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Field name used in the audit trail for link changes.
const LINKS_FIELD: &str = "links";

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub view: CaseView,
    /// Entries written on the commanded case.
    pub entries: Vec<AuditEntry>,
    /// Cases opened as a side effect (escalated incident, follow-up CAPA).
    pub spawned: Vec<CaseId>,
    /// The command id had already been applied; nothing was done.
    pub replayed: bool,
}

/// Side effects after the target checks, ready to run.
#[derive(Debug, Default)]
struct Plan {
    notes: Vec<TrailNote>,
    open: Vec<(CaseKind, NewCase, Relation)>,
    link: Vec<Link>,
    unlink: Vec<CaseId>,
}

/// The case lifecycle workflow engine.
pub struct WorkflowEngine {
    cases: Arc<dyn CaseStore>,
    audit: Arc<dyn AuditLog>,
    links: Arc<dyn LinkGraph>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    locks: DashMap<CaseId, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("config", &self.config)
            .field("locked_cases", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl WorkflowEngine {
    pub fn new(
        cases: Arc<dyn CaseStore>,
        audit: Arc<dyn AuditLog>,
        links: Arc<dyn LinkGraph>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cases,
            audit,
            links,
            config,
            clock,
            locks: DashMap::new(),
        }
    }

    /// Engine over fresh in-memory stores.
    pub fn in_memory(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let audit = Arc::new(InMemoryAuditLog::new());
        let cases = Arc::new(InMemoryCaseStore::new(audit.clone(), config.clone()));
        let links = Arc::new(InMemoryLinkGraph::new());
        Self::new(cases, audit, links, config, clock)
    }

    /// In-memory engine on the wall clock with default configuration.
    pub fn with_defaults() -> Self {
        Self::in_memory(EngineConfig::default(), Arc::new(SystemClock))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Open a new case. A repeated `command_id` returns the case it opened.
    pub fn open_case(
        &self,
        kind: CaseKind,
        seed: &NewCase,
        actor: &ActorId,
        command_id: Option<CommandId>,
    ) -> CaseflowResult<CaseView> {
        if let Some(command_id) = command_id {
            if let Some(existing) = self.audit.find_command(command_id)? {
                debug!(case_id = %existing, %command_id, "open_case replayed");
                return self.view(&existing);
            }
        }

        let mut context = ChangeContext::new("open_case", actor.clone(), self.clock.now());
        if let Some(command_id) = command_id {
            context = context.with_command(command_id);
        }
        let case = self.cases.create(kind, seed, &context)?;
        info!(
            case_id = %case.id,
            kind = %kind,
            actor = %actor,
            priority = %case.priority,
            regulatory = case.regulatory_flag,
            "Case opened"
        );
        self.view(&case.id)
    }

    /// Execute a command against a case.
    pub fn execute(&self, case_id: &CaseId, envelope: CommandEnvelope) -> CaseflowResult<Outcome> {
        let name = envelope.command.name();
        let span = tracing::info_span!(
            "execute",
            case_id = %case_id,
            command = %name,
            actor = %envelope.actor,
            command_id = %envelope.command_id,
        );
        let _entered = span.enter();

        // Cases are never removed, so only ids that exist get a lock entry.
        if let Err(err) = self.cases.get(case_id) {
            warn!(error = %err, "command refused");
            return Err(err);
        }
        let lock = self.case_lock(case_id);
        let _guard = lock.lock().map_err(|_| StorageError::LockPoisoned)?;

        if self.audit.contains_command(case_id, envelope.command_id)? {
            debug!("command already applied");
            return Ok(Outcome {
                view: self.view(case_id)?,
                entries: Vec::new(),
                spawned: Vec::new(),
                replayed: true,
            });
        }

        let case = self.cases.get(case_id)?;
        let now = self.clock.now();

        let planned = decide(&case, &envelope.command, &envelope.actor, &self.config, now)
            .and_then(|decision| {
                let plan = self.plan(&case, &decision)?;
                Ok((decision, plan))
            });
        let (decision, plan) = match planned {
            Ok(planned) => planned,
            Err(err) => {
                self.reject(&case, &envelope, name, &err, now);
                return Err(err);
            }
        };

        let context = ChangeContext::new(name.as_str(), envelope.actor.clone(), now)
            .with_command(envelope.command_id);

        // Linked cases first so their ids can appear in this case's trail.
        // `CaseStore::apply` notes what a failed apply leaves behind.
        let mut spawned = Vec::new();
        let mut notes = plan.notes;
        let mut links = plan.link;
        for (kind, seed, relation) in plan.open {
            let opened = self.cases.create(kind, &seed, &context)?;
            info!(case_id = %opened.id, kind = %kind, relation = %relation, "Linked case opened");
            notes.push(link_note(None, Some((relation, &opened.id))));
            links.push(Link::new(case.id.clone(), opened.id.clone(), relation));
            spawned.push(opened.id);
        }

        let changes = ChangeSet {
            context,
            deltas: decision.deltas,
            notes,
        };
        let applied = self.cases.apply(case_id, case.version, changes)?;

        for link in links {
            let relation = link.relation;
            let target = link.to_id.clone();
            if self.links.link(link)? {
                info!(target = %target, relation = %relation, "Cases linked");
            }
        }
        for target in plan.unlink {
            let removed = self.links.unlink(case_id, &target)?;
            info!(target = %target, removed = removed.len(), "Cases unlinked");
        }

        if name == CommandName::ExtendSla {
            info!(due = ?applied.case.sla_due_date, "SLA extended");
        }
        info!(
            status = %applied.case.status,
            entries = applied.entries.len(),
            version = applied.case.version,
            "command applied"
        );

        Ok(Outcome {
            view: self.view_of(applied.case)?,
            entries: applied.entries,
            spawned,
            replayed: false,
        })
    }

    /// Check link targets and turn side effects into a runnable plan.
    fn plan(&self, case: &Case, decision: &Decision) -> CaseflowResult<Plan> {
        let mut plan = Plan {
            notes: decision.notes.clone(),
            ..Plan::default()
        };
        let existing = self.links.links_of(&case.id)?;

        for effect in &decision.effects {
            match effect {
                SideEffect::OpenLinked {
                    kind,
                    seed,
                    relation,
                } => {
                    seed.validate()?;
                    plan.open.push((*kind, seed.clone(), *relation));
                }
                SideEffect::Link { target, relation } => {
                    // Unknown targets fail here, before anything is written.
                    self.cases.get(target)?;
                    let duplicate = existing
                        .iter()
                        .any(|r| &r.other_id == target && r.relation == *relation);
                    if !duplicate {
                        plan.notes.push(link_note(None, Some((*relation, target))));
                        plan.link
                            .push(Link::new(case.id.clone(), target.clone(), *relation));
                    }
                }
                SideEffect::Unlink { target } => {
                    let current: Vec<_> =
                        existing.iter().filter(|r| &r.other_id == target).collect();
                    if current.is_empty() {
                        return Err(StorageError::NotFound {
                            record_type: RecordType::Link,
                            id: format!("{} <-> {}", case.id, target),
                        }
                        .into());
                    }
                    for link in current {
                        plan.notes
                            .push(link_note(Some((link.relation, target)), None));
                    }
                    plan.unlink.push(target.clone());
                }
            }
        }

        if decision.deltas.is_empty() && plan.notes.is_empty() && plan.open.is_empty() {
            debug!(command = %decision.command, "command changes nothing");
        }
        Ok(plan)
    }

    fn reject(
        &self,
        case: &Case,
        envelope: &CommandEnvelope,
        name: CommandName,
        err: &CaseflowError,
        now: Timestamp,
    ) {
        warn!(status = %case.status, error = %err, "command refused");
        let rejection = RejectedCommand {
            case_id: case.id.clone(),
            command_id: Some(envelope.command_id),
            command: name.to_string(),
            actor: envelope.actor.clone(),
            status: Some(case.status),
            reason: err.to_string(),
            attempted_at: now,
        };
        if let Err(journal_err) = self.audit.record_rejection(rejection) {
            warn!(error = %journal_err, "failed to journal refused command");
        }
    }

    /// Number of per-case locks held; one per case that has seen a command.
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    fn case_lock(&self, case_id: &CaseId) -> Arc<Mutex<()>> {
        self.locks
            .entry(case_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Case with live SLA status and links.
    pub fn view(&self, case_id: &CaseId) -> CaseflowResult<CaseView> {
        let case = self.cases.get(case_id)?;
        self.view_of(case)
    }

    fn view_of(&self, case: Case) -> CaseflowResult<CaseView> {
        let sla_status = case.sla_status(self.clock.now(), self.config.sla_warning_window()?)?;
        let links = self.links.links_of(&case.id)?;
        Ok(CaseView {
            case,
            sla_status,
            links,
        })
    }

    pub fn list(&self, filter: &CaseFilter) -> CaseflowResult<Vec<CaseView>> {
        self.cases
            .list(filter)?
            .into_iter()
            .map(|case| self.view_of(case))
            .collect()
    }

    /// Audit trail of an existing case.
    pub fn audit_trail(&self, case_id: &CaseId) -> CaseflowResult<AuditTrail> {
        self.cases.get(case_id)?;
        self.audit.entries_for(case_id)
    }

    pub fn links_of(&self, case_id: &CaseId) -> CaseflowResult<Vec<LinkRef>> {
        self.cases.get(case_id)?;
        self.links.links_of(case_id)
    }

    /// Refused commands for a case.
    pub fn rejections(&self, case_id: &CaseId) -> CaseflowResult<Vec<RejectedCommand>> {
        self.cases.get(case_id)?;
        self.audit.rejections_for(case_id)
    }

    /// Commands currently legal on a case.
    pub fn legal_commands(&self, case_id: &CaseId) -> CaseflowResult<Vec<CommandName>> {
        let case = self.cases.get(case_id)?;
        Ok(crate::transitions::legal_commands(case.status))
    }

    /// Action items and notifications for `actor`.
    pub fn inbox(&self, actor: &ActorId) -> CaseflowResult<InboxView> {
        Inbox::new(self.cases.clone(), self.config.clone()).for_actor(actor, self.clock.now())
    }
}

/// Audit note for a link added (`new`) or removed (`old`).
fn link_note(
    old: Option<(Relation, &CaseId)>,
    new: Option<(Relation, &CaseId)>,
) -> TrailNote {
    let render = |(relation, id): (Relation, &CaseId)| format!("{} {}", relation, id);
    TrailNote {
        field: LINKS_FIELD.to_string(),
        old_value: old.map(render),
        new_value: new.map(render),
    }
}
