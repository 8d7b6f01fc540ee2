//! In-memory audit log

use crate::{read, write, AuditLog, AuditTrail};
use caseflow_core::{AuditEntry, CaseId, CaseflowResult, CommandId, RejectedCommand};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct LogState {
    /// Copy-on-write per case so snapshots never see later appends.
    trails: HashMap<CaseId, Arc<Vec<AuditEntry>>>,
    /// Cases each command wrote to, first one first.
    commands: HashMap<CommandId, Vec<CaseId>>,
    rejections: HashMap<CaseId, Vec<RejectedCommand>>,
}

/// Append-only audit log held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    state: Arc<RwLock<LogState>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries across all cases.
    pub fn entry_count(&self) -> CaseflowResult<usize> {
        let state = read(&self.state)?;
        Ok(state.trails.values().map(|t| t.len()).sum())
    }
}

impl LogState {
    fn push(&mut self, mut entry: AuditEntry) -> AuditEntry {
        let trail = Arc::make_mut(self.trails.entry(entry.case_id.clone()).or_default());
        entry.sequence = trail.len() as u64 + 1;
        if let Some(command_id) = entry.command_id {
            let cases = self.commands.entry(command_id).or_default();
            if !cases.contains(&entry.case_id) {
                cases.push(entry.case_id.clone());
            }
        }
        trail.push(entry.clone());
        entry
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, entry: AuditEntry) -> CaseflowResult<()> {
        entry.validate()?;
        let mut state = write(&self.state)?;
        state.push(entry);
        Ok(())
    }

    fn append_batch(&self, entries: Vec<AuditEntry>) -> CaseflowResult<Vec<AuditEntry>> {
        // Validate everything first so a bad entry leaves the log untouched.
        for entry in &entries {
            entry.validate()?;
        }
        let mut state = write(&self.state)?;
        Ok(entries.into_iter().map(|e| state.push(e)).collect())
    }

    fn entries_for(&self, case_id: &CaseId) -> CaseflowResult<AuditTrail> {
        let state = read(&self.state)?;
        Ok(state
            .trails
            .get(case_id)
            .map(|trail| AuditTrail::new(Arc::clone(trail)))
            .unwrap_or_default())
    }

    fn contains_command(&self, case_id: &CaseId, command_id: CommandId) -> CaseflowResult<bool> {
        let state = read(&self.state)?;
        Ok(state
            .commands
            .get(&command_id)
            .is_some_and(|cases| cases.contains(case_id)))
    }

    fn find_command(&self, command_id: CommandId) -> CaseflowResult<Option<CaseId>> {
        let state = read(&self.state)?;
        Ok(state
            .commands
            .get(&command_id)
            .and_then(|cases| cases.first().cloned()))
    }

    fn record_rejection(&self, rejection: RejectedCommand) -> CaseflowResult<()> {
        let mut state = write(&self.state)?;
        state
            .rejections
            .entry(rejection.case_id.clone())
            .or_default()
            .push(rejection);
        Ok(())
    }

    fn rejections_for(&self, case_id: &CaseId) -> CaseflowResult<Vec<RejectedCommand>> {
        let state = read(&self.state)?;
        Ok(state.rejections.get(case_id).cloned().unwrap_or_default())
    }
}
