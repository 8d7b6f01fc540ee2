//! Caseflow Test Utilities
//!
//! Shared test infrastructure for the Caseflow workspace:
//! - Proptest generators for seeds, enums and actors
//! - Fixtures: fixed clocks, seeds and in-memory stores
//! - Custom assertions for Caseflow-specific errors and audit trails

pub use caseflow_core::{
    ActorId, AuditEntry, Case, CaseId, CaseKind, CaseStatus, CaseflowError, CaseflowResult,
    Category, EngineConfig, ManualClock, NewCase, Phase, Priority, RcaMethod, RecordType, Relation,
    ResolutionType, Severity, StorageError, Timestamp, ValidationError, WorkflowError,
};
pub use caseflow_storage::{
    AuditLog, AuditTrail, CaseStore, InMemoryAuditLog, InMemoryCaseStore, InMemoryLinkGraph,
    LinkGraph,
};

use chrono::{TimeZone, Utc};
use std::sync::Arc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Caseflow types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_case_kind() -> impl Strategy<Value = CaseKind> {
        prop::sample::select(CaseKind::ALL.to_vec())
    }

    pub fn arb_severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(Severity::ALL.to_vec())
    }

    pub fn arb_category() -> impl Strategy<Value = Category> {
        prop::sample::select(Category::ALL.to_vec())
    }

    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop::sample::select(Priority::ALL.to_vec())
    }

    pub fn arb_relation() -> impl Strategy<Value = Relation> {
        prop::sample::select(Relation::ALL.to_vec())
    }

    pub fn arb_rca_method() -> impl Strategy<Value = RcaMethod> {
        prop::sample::select(RcaMethod::ALL.to_vec())
    }

    pub fn arb_resolution_type() -> impl Strategy<Value = ResolutionType> {
        prop::sample::select(ResolutionType::ALL.to_vec())
    }

    /// A small pool of actor names so generated commands collide on owners.
    pub fn arb_actor() -> impl Strategy<Value = ActorId> {
        prop::sample::select(vec!["alice", "bob", "carol", "dana"])
            .prop_filter_map("actor names are never blank", |name| ActorId::new(name).ok())
    }

    /// Non-blank free text.
    pub fn arb_text() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,40}"
    }

    /// Generate a valid case seed.
    pub fn arb_new_case() -> impl Strategy<Value = NewCase> {
        (
            arb_text(),
            arb_category(),
            arb_severity(),
            proptest::option::of(arb_actor()),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(title, category, severity, owner, regulatory_flag)| {
                let mut seed = NewCase::new(title, category, severity);
                seed.owner = owner;
                seed.regulatory_flag = regulatory_flag;
                seed
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;

    /// Fixed instant every fixture clock starts at: 2025-03-10 09:00 UTC.
    pub fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(t0()))
    }

    /// Actor by name. Panics on a blank name.
    #[track_caller]
    pub fn actor(name: &str) -> ActorId {
        match ActorId::new(name) {
            Ok(actor) => actor,
            Err(err) => panic!("invalid fixture actor {:?}: {}", name, err),
        }
    }

    /// Critical safety complaint: forced regulatory, P1.
    pub fn safety_complaint() -> NewCase {
        NewCase::new(
            "Device overheated during charging",
            Category::Safety,
            Severity::Critical,
        )
        .with_owner(actor("quality.lead"))
        .with_description("Customer reports scorch marks on the charging port")
    }

    /// Medium quality complaint: P3, not regulatory.
    pub fn quality_complaint() -> NewCase {
        NewCase::new("Label misprinted", Category::Quality, Severity::Medium)
            .with_owner(actor("quality.lead"))
    }

    /// Seed suitable for any kind.
    pub fn seed(title: &str) -> NewCase {
        NewCase::new(title, Category::Operational, Severity::Low).with_owner(actor("owner"))
    }

    /// Audit log, case store and link graph sharing one audit log.
    pub struct Stores {
        pub audit: Arc<InMemoryAuditLog>,
        pub cases: Arc<InMemoryCaseStore>,
        pub links: Arc<InMemoryLinkGraph>,
    }

    pub fn stores(config: EngineConfig) -> Stores {
        let audit = Arc::new(InMemoryAuditLog::new());
        let cases = Arc::new(InMemoryCaseStore::new(audit.clone(), config));
        Stores {
            audit,
            cases,
            links: Arc::new(InMemoryLinkGraph::new()),
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for Caseflow results and audit trails.

    use super::*;

    /// Assert that a CaseflowResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a CaseflowResult is a NotFound storage error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(
        result: &CaseflowResult<T>,
        record_type: RecordType,
    ) {
        match result {
            Err(CaseflowError::Storage(StorageError::NotFound {
                record_type: rt, ..
            })) => {
                assert_eq!(*rt, record_type, "Wrong record type in NotFound error");
            }
            other => panic!(
                "Expected NotFound error for {}, got: {:?}",
                record_type, other
            ),
        }
    }

    /// Assert an illegal transition naming `command`, returning the commands
    /// the error reports as allowed.
    #[track_caller]
    pub fn assert_illegal_transition<T: std::fmt::Debug>(
        result: &CaseflowResult<T>,
        command: &str,
    ) -> Vec<String> {
        match result {
            Err(CaseflowError::Workflow(WorkflowError::IllegalTransition {
                command: c,
                allowed,
                ..
            })) => {
                assert_eq!(c, command, "Wrong command in IllegalTransition");
                allowed.clone()
            }
            other => panic!("Expected IllegalTransition for {}, got: {:?}", command, other),
        }
    }

    #[track_caller]
    pub fn assert_conflict<T: std::fmt::Debug>(result: &CaseflowResult<T>) {
        match result {
            Err(CaseflowError::Workflow(WorkflowError::Conflict { .. })) => {}
            other => panic!("Expected Conflict, got: {:?}", other),
        }
    }

    /// Assert trail sequences are 1..=n and timestamps never go backwards.
    #[track_caller]
    pub fn assert_trail_ordered(trail: &AuditTrail) {
        let mut previous: Option<&AuditEntry> = None;
        for (i, entry) in trail.iter().enumerate() {
            assert_eq!(entry.sequence, i as u64 + 1, "Gap in audit sequence");
            if let Some(prev) = previous {
                assert!(
                    prev.performed_at <= entry.performed_at,
                    "Audit entry {} is older than the one before it",
                    entry.sequence
                );
            }
            previous = Some(entry);
        }
    }

    /// Assert `field` was written at most once in the trail.
    #[track_caller]
    pub fn assert_set_once(trail: &AuditTrail, field: &str) {
        let writes = trail
            .iter()
            .filter(|e| e.field.as_deref() == Some(field))
            .count();
        assert!(writes <= 1, "{} written {} times", field, writes);
    }

    #[track_caller]
    pub fn assert_phase(case: &Case, phase: Phase) {
        assert_eq!(
            case.phase(),
            phase,
            "Case {} is {} ({:?}), expected {:?}",
            case.id,
            case.status,
            case.phase(),
            phase
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_storage::ChangeContext;
    use proptest::prelude::*;

    #[test]
    fn test_safety_complaint_fixture() {
        let seed = fixtures::safety_complaint();
        assert!(seed.validate().is_ok());
        assert_eq!(caseflow_core::priority_for(seed.severity), Priority::P1);
        assert!(caseflow_core::regulatory_forced(seed.category, seed.severity));
    }

    #[test]
    fn test_store_fixture_audits_creation() {
        let stores = fixtures::stores(EngineConfig::default());
        let ctx = ChangeContext::new("open_case", fixtures::actor("a"), fixtures::t0());
        let case = stores
            .cases
            .create(CaseKind::Risk, &fixtures::seed("Supplier exposure"), &ctx)
            .unwrap();
        assertions::assert_phase(&case, Phase::Intake);
        let trail = stores.audit.entries_for(&case.id).unwrap();
        assert!(!trail.is_empty());
        assertions::assert_trail_ordered(&trail);
    }

    #[test]
    fn test_assertion_not_found() {
        let result: CaseflowResult<()> = Err(StorageError::NotFound {
            record_type: RecordType::Case,
            id: "CMP-2025-0001".into(),
        }
        .into());
        assertions::assert_not_found(&result, RecordType::Case);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_seeds_are_valid(seed in generators::arb_new_case()) {
            prop_assert!(seed.validate().is_ok());
        }

        #[test]
        fn prop_generated_actors_are_trimmed(actor in generators::arb_actor()) {
            prop_assert_eq!(actor.as_str().trim(), actor.as_str());
        }
    }
}
