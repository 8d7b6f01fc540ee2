//! Caseflow Core - Case Types and Pure Rules
//!
//! Data structures shared by every other crate, plus the pure pieces of the
//! workflow: SLA evaluation, severity to priority mapping and the regulatory
//! forcing rule. No storage, no I/O.

pub mod clock;
pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod policy;
pub mod sla;
pub mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use entities::{
    AuditEntry, Case, CaseField, CaseFilter, CaseView, FieldDelta, FieldValue, Link,
    LinkDirection, LinkRef, NewCase, RejectedCommand,
};
pub use enums::{
    CaseKind, Category, EnumParseError, Priority, RcaMethod, Relation, ResolutionType, Severity,
    SlaStatus, TriageDecision,
};
pub use error::{
    CaseflowError, CaseflowResult, ConfigError, RecordType, StorageError, ValidationError,
    WorkflowError,
};
pub use identity::{new_command_id, ActorId, AuditEntryId, CaseId, CommandId, Timestamp};
pub use policy::{priority_for, regulatory_forced};
pub use status::{
    AuditStatus, CapaStatus, CaseStatus, ComplaintStatus, IncidentStatus, Phase, RiskStatus,
};
