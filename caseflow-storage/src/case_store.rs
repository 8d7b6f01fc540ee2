//! In-memory case store

use crate::{read, write, Applied, AuditLog, CaseStore, ChangeContext, ChangeSet};
use caseflow_core::{
    AuditEntry, Case, CaseField, CaseFilter, CaseId, CaseKind, CaseflowError, CaseflowResult,
    ConfigError, EngineConfig, NewCase, RecordType, StorageError, WorkflowError,
};
use chrono::Datelike;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct StoreState {
    cases: HashMap<CaseId, Case>,
    /// Last issued sequence per kind and year.
    sequences: HashMap<(CaseKind, i32), u32>,
}

/// Case records held in memory. Every mutation is mirrored into the audit
/// log it was built with.
#[derive(Clone)]
pub struct InMemoryCaseStore {
    state: Arc<RwLock<StoreState>>,
    audit: Arc<dyn AuditLog>,
    config: EngineConfig,
}

impl std::fmt::Debug for InMemoryCaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCaseStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InMemoryCaseStore {
    pub fn new(audit: Arc<dyn AuditLog>, config: EngineConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            audit,
            config,
        }
    }

    pub fn case_count(&self) -> CaseflowResult<usize> {
        Ok(read(&self.state)?.cases.len())
    }

    /// Insert a case as-is, bypassing id generation and auditing. Meant for
    /// seeding from an external source; integrity is still checked.
    pub fn import(&self, case: Case) -> CaseflowResult<()> {
        case.check_integrity()?;
        let mut state = write(&self.state)?;
        if state.cases.contains_key(&case.id) {
            return Err(StorageError::InsertFailed {
                record_type: RecordType::Case,
                reason: format!("{} already exists", case.id),
            }
            .into());
        }
        let year = case.created_at.year();
        let seq = trailing_sequence(&case.id);
        let last = state.sequences.entry((case.kind, year)).or_insert(0);
        *last = (*last).max(seq);
        state.cases.insert(case.id.clone(), case);
        Ok(())
    }
}

fn trailing_sequence(id: &CaseId) -> u32 {
    id.as_str()
        .rsplit('-')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Audit entry for one field going from `old` to `new`.
fn field_entry(
    context: &ChangeContext,
    case_id: &CaseId,
    field: CaseField,
    old: Option<String>,
    new: Option<String>,
) -> AuditEntry {
    context.entry(case_id).with_change(field.as_str(), old, new)
}

impl CaseStore for InMemoryCaseStore {
    fn create(
        &self,
        kind: CaseKind,
        seed: &NewCase,
        context: &ChangeContext,
    ) -> CaseflowResult<Case> {
        seed.validate()?;
        let mut state = write(&self.state)?;

        let year = context.at.year();
        let next = state
            .sequences
            .get(&(kind, year))
            .copied()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StorageError::InsertFailed {
                record_type: RecordType::Case,
                reason: format!("{} sequence exhausted for {}", kind, year),
            })?;
        let id = CaseId::new(kind, year, next, self.config.sequence_width);
        if state.cases.contains_key(&id) {
            return Err(StorageError::InsertFailed {
                record_type: RecordType::Case,
                reason: format!("{} already exists", id),
            }
            .into());
        }

        let lead = self.config.lead_time(kind)?;
        let due = context
            .at
            .checked_add_signed(lead)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: format!("lead_time_days.{}", kind),
                value: lead.num_days().to_string(),
                reason: format!("due date overflows from {}", context.at.to_rfc3339()),
            })?;
        let case = Case::open(id.clone(), seed, context.at, due);

        let entries = CaseField::INITIAL
            .iter()
            .filter_map(|field| {
                case.field(*field)
                    .render()
                    .map(|value| field_entry(context, &id, *field, None, Some(value)))
            })
            .collect();
        self.audit.append_batch(entries)?;

        state.sequences.insert((kind, year), next);
        state.cases.insert(id, case.clone());
        Ok(case)
    }

    fn get(&self, id: &CaseId) -> CaseflowResult<Case> {
        let state = read(&self.state)?;
        state
            .cases
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::case_not_found(id).into())
    }

    fn apply(
        &self,
        id: &CaseId,
        expected_version: u64,
        changes: ChangeSet,
    ) -> CaseflowResult<Applied> {
        let mut state = write(&self.state)?;
        let stored = state
            .cases
            .get(id)
            .ok_or_else(|| CaseflowError::from(StorageError::case_not_found(id)))?;

        if stored.version != expected_version {
            return Err(WorkflowError::Conflict {
                case_id: id.clone(),
                expected_version,
                actual_version: stored.version,
            }
            .into());
        }

        let ChangeSet {
            context,
            deltas,
            notes,
        } = changes;

        let mut next = stored.clone();
        let mut entries = Vec::new();
        for delta in deltas {
            let old = next.field(delta.field);
            if delta.field.is_stage_timestamp() && !old.is_null() {
                continue;
            }
            if old == delta.value {
                continue;
            }
            let new_rendered = delta.value.render();
            next.set_field(delta.field, delta.value)?;
            entries.push(field_entry(
                &context,
                id,
                delta.field,
                old.render(),
                new_rendered,
            ));
        }
        for note in notes {
            entries.push(
                context
                    .entry(id)
                    .with_change(note.field, note.old_value, note.new_value),
            );
        }

        if entries.is_empty() {
            return Ok(Applied {
                case: next,
                entries,
            });
        }

        next.updated_at = context.at;
        next.version += 1;
        next.check_integrity()?;

        // The trail is written before the case; a failed append leaves the
        // stored case untouched.
        let entries = self.audit.append_batch(entries)?;
        state.cases.insert(id.clone(), next.clone());

        Ok(Applied {
            case: next,
            entries,
        })
    }

    fn list(&self, filter: &CaseFilter) -> CaseflowResult<Vec<Case>> {
        let state = read(&self.state)?;
        let mut cases: Vec<Case> = state
            .cases
            .values()
            .filter(|case| filter.matches(case))
            .cloned()
            .collect();
        cases.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(cases)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::InMemoryAuditLog;
    use caseflow_core::{ActorId, Category, FieldDelta, FieldValue, Severity};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Critical),
            Just(Severity::High),
            Just(Severity::Medium),
            Just(Severity::Low),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every applied change set either bumps the version and writes at
        /// least one entry, or writes nothing and keeps the version.
        #[test]
        fn prop_apply_is_all_or_nothing(severities in prop::collection::vec(arb_severity(), 1..12)) {
            let audit = Arc::new(InMemoryAuditLog::new());
            let store = InMemoryCaseStore::new(audit.clone(), EngineConfig::default());
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default();
            let actor = ActorId::new("prop").unwrap();
            let seed = NewCase::new("Prop case", Category::Quality, Severity::Medium);
            let mut case = store
                .create(CaseKind::Complaint, &seed, &ChangeContext::new("open", actor.clone(), start))
                .unwrap();

            for (i, severity) in severities.into_iter().enumerate() {
                let before_len = audit.entries_for(&case.id).unwrap().len();
                let mut changes = ChangeSet::new(ChangeContext::new(
                    "reclassify",
                    actor.clone(),
                    start + Duration::minutes(i as i64),
                ));
                changes.deltas = vec![FieldDelta::new(CaseField::Severity, FieldValue::Severity(severity))];
                let applied = store.apply(&case.id, case.version, changes).unwrap();
                let after_len = audit.entries_for(&case.id).unwrap().len();

                if severity == case.severity {
                    prop_assert!(!applied.changed());
                    prop_assert_eq!(applied.case.version, case.version);
                    prop_assert_eq!(after_len, before_len);
                } else {
                    prop_assert_eq!(applied.entries.len(), 1);
                    prop_assert_eq!(applied.case.version, case.version + 1);
                    prop_assert_eq!(after_len, before_len + 1);
                }
                case = applied.case;
            }
        }
    }
}
