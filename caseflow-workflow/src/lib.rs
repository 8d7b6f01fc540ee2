//! Caseflow Workflow - Case Lifecycle State Machine
//!
//! Commands, the per-kind transition tables, the engine that applies
//! commands to stored cases, and the action-item projection.
//!
//! ```text
//! CommandEnvelope ─► WorkflowEngine::execute
//!                      ├─ transitions (is it legal here?)
//!                      ├─ decide      (what changes?)
//!                      └─ CaseStore::apply + AuditLog + LinkGraph
//! ```

pub mod command;
pub mod decide;
pub mod engine;
pub mod inbox;
pub mod transitions;

pub use command::{
    ApproveRcaPayload, ArchivePayload, AssignPayload, ClosePayload, Command, CommandEnvelope,
    CommandName, ExtendSlaPayload, LinkRecordPayload, OverridePriorityPayload, SubmitRcaPayload,
    SubmitResolutionPayload, TriagePayload, UnlinkRecordPayload,
};
pub use decide::{decide, Decision, SideEffect};
pub use engine::{Outcome, WorkflowEngine};
pub use inbox::{ActionItem, Inbox, InboxView, Notification, NotificationKind};
pub use transitions::{is_legal, legal_commands, table_for, TransitionTable};
