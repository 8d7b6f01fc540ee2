//! Caseflow Storage - Storage Traits and In-Memory Implementations
//!
//! Three stores back the workflow engine:
//! - [`CaseStore`] owns case records and writes an audit entry per changed field
//! - [`AuditLog`] is the append-only trail, plus a separate journal of refused commands
//! - [`LinkGraph`] holds typed links between cases, visible from both ends
//!
//! The in-memory implementations share state through `Arc<RwLock<..>>` and
//! surface lock poisoning as [`StorageError::LockPoisoned`].

pub mod audit_log;
pub mod case_store;
pub mod link_graph;

pub use audit_log::InMemoryAuditLog;
pub use case_store::InMemoryCaseStore;
pub use link_graph::InMemoryLinkGraph;

use caseflow_core::{
    ActorId, AuditEntry, Case, CaseFilter, CaseId, CaseKind, CaseflowResult, CommandId,
    FieldDelta, Link, LinkRef, NewCase, RejectedCommand, StorageError, Timestamp,
};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// CHANGE TYPES
// ============================================================================

/// Who did what, when, and under which command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContext {
    /// Action name written to every audit entry, e.g. `triage`.
    pub action: String,
    pub actor: ActorId,
    pub command_id: Option<CommandId>,
    pub at: Timestamp,
}

impl ChangeContext {
    pub fn new(action: impl Into<String>, actor: ActorId, at: Timestamp) -> Self {
        Self {
            action: action.into(),
            actor,
            command_id: None,
            at,
        }
    }

    pub fn with_command(mut self, command_id: CommandId) -> Self {
        self.command_id = Some(command_id);
        self
    }

    fn entry(&self, case_id: &CaseId) -> AuditEntry {
        AuditEntry::new(case_id.clone(), self.action.clone(), self.actor.clone(), self.at)
            .with_command(self.command_id)
    }
}

/// Audit-only change that does not touch a case field, such as a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailNote {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Everything one command wants to change on one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub context: ChangeContext,
    pub deltas: Vec<FieldDelta>,
    pub notes: Vec<TrailNote>,
}

impl ChangeSet {
    pub fn new(context: ChangeContext) -> Self {
        Self {
            context,
            deltas: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Result of [`CaseStore::apply`]: the case as stored afterwards and the
/// audit entries written. No entries means nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub case: Case,
    pub entries: Vec<AuditEntry>,
}

impl Applied {
    pub fn changed(&self) -> bool {
        !self.entries.is_empty()
    }
}

// ============================================================================
// AUDIT TRAIL
// ============================================================================

/// Snapshot of one case's audit trail in append order.
///
/// Taking a snapshot is cheap. Entries appended afterwards are not visible
/// in it, and it can be iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditTrail {
    entries: Arc<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new(entries: Arc<Vec<AuditEntry>>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<AuditEntry> {
        self.entries.as_ref().clone()
    }
}

impl<'a> IntoIterator for &'a AuditTrail {
    type Item = &'a AuditEntry;
    type IntoIter = std::slice::Iter<'a, AuditEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// STORAGE TRAITS
// ============================================================================

/// Case records keyed by generated id.
pub trait CaseStore: Send + Sync {
    /// Open a case of `kind`: assign the next id for the kind and year, set
    /// the initial status and due date, and audit the initial fields.
    fn create(&self, kind: CaseKind, seed: &NewCase, context: &ChangeContext)
        -> CaseflowResult<Case>;

    /// Get a case by id, `NotFound` if unknown.
    fn get(&self, id: &CaseId) -> CaseflowResult<Case>;

    /// Apply a change set if the stored version still equals
    /// `expected_version`.
    ///
    /// Unchanged values and already-set stage timestamps are skipped. The
    /// case write and the audit append happen together or not at all.
    ///
    /// The workflow engine opens linked cases (escalated incident, follow-up
    /// CAPA) before it applies the commanding case's change set, and holds
    /// a per-case lock across both. A store shared with writers outside
    /// that engine can fail here with `Conflict` after those cases exist;
    /// they are then left unlinked.
    fn apply(&self, id: &CaseId, expected_version: u64, changes: ChangeSet)
        -> CaseflowResult<Applied>;

    /// Cases matching `filter`, oldest first.
    fn list(&self, filter: &CaseFilter) -> CaseflowResult<Vec<Case>>;
}

/// Append-only audit trail keyed by case id.
pub trait AuditLog: Send + Sync {
    /// Append one entry. Fails only on malformed entries.
    fn append(&self, entry: AuditEntry) -> CaseflowResult<()>;

    /// Append several entries atomically; returns them as stored.
    fn append_batch(&self, entries: Vec<AuditEntry>) -> CaseflowResult<Vec<AuditEntry>>;

    /// Entries for a case in append order. Unknown cases yield an empty trail.
    fn entries_for(&self, case_id: &CaseId) -> CaseflowResult<AuditTrail>;

    /// Whether `command_id` already produced an entry on `case_id`.
    fn contains_command(&self, case_id: &CaseId, command_id: CommandId) -> CaseflowResult<bool>;

    /// Case an already-applied command was recorded against.
    fn find_command(&self, command_id: CommandId) -> CaseflowResult<Option<CaseId>>;

    /// Journal a refused command. Never part of the case trail.
    fn record_rejection(&self, rejection: RejectedCommand) -> CaseflowResult<()>;

    fn rejections_for(&self, case_id: &CaseId) -> CaseflowResult<Vec<RejectedCommand>>;
}

/// Typed links between cases.
pub trait LinkGraph: Send + Sync {
    /// Add a link. Returns `false` if the same pair and relation already
    /// exists in either direction.
    fn link(&self, link: Link) -> CaseflowResult<bool>;

    /// Remove every link between `a` and `b`. `NotFound` if there is none.
    fn unlink(&self, a: &CaseId, b: &CaseId) -> CaseflowResult<Vec<Link>>;

    /// Links touching `id`, seen from `id`, in creation order.
    fn links_of(&self, id: &CaseId) -> CaseflowResult<Vec<LinkRef>>;
}

// ============================================================================
// LOCK HELPERS
// ============================================================================

pub(crate) fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StorageError> {
    lock.read().map_err(|_| StorageError::LockPoisoned)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StorageError> {
    lock.write().map_err(|_| StorageError::LockPoisoned)
}
