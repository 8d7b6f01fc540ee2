//! Workflow commands
//!
//! A command is a named request to change one case. On the wire it is
//! `{"command": "<name>", "payload": {...}}`.

use caseflow_core::{
    new_command_id, ActorId, CaseId, CaseKind, Category, CommandId, Priority, RcaMethod,
    Relation, ResolutionType, Severity, Timestamp, TriageDecision,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command names, used in transition tables and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CommandName {
    Triage,
    Assign,
    SubmitRca,
    ApproveRca,
    SubmitResolution,
    Close,
    LinkRecord,
    UnlinkRecord,
    ExtendSla,
    OverridePriority,
    Archive,
}

impl CommandName {
    pub const ALL: &'static [CommandName] = &[
        CommandName::Triage,
        CommandName::Assign,
        CommandName::SubmitRca,
        CommandName::ApproveRca,
        CommandName::SubmitResolution,
        CommandName::Close,
        CommandName::LinkRecord,
        CommandName::UnlinkRecord,
        CommandName::ExtendSla,
        CommandName::OverridePriority,
        CommandName::Archive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Triage => "triage",
            CommandName::Assign => "assign",
            CommandName::SubmitRca => "submit_rca",
            CommandName::ApproveRca => "approve_rca",
            CommandName::SubmitResolution => "submit_resolution",
            CommandName::Close => "close",
            CommandName::LinkRecord => "link_record",
            CommandName::UnlinkRecord => "unlink_record",
            CommandName::ExtendSla => "extend_sla",
            CommandName::OverridePriority => "override_priority",
            CommandName::Archive => "archive",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TriagePayload {
    pub decision: TriageDecision,
    pub category: Category,
    pub severity: Severity,
    #[serde(default)]
    pub assignee: Option<ActorId>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Regulatory significance as judged by the triager.
    #[serde(default, alias = "regulatorySignificance")]
    pub regulatory_flag: Option<bool>,
    /// Existing incident to link on escalation. A new one is opened if absent.
    #[serde(default)]
    pub incident_id: Option<CaseId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub assignee: ActorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SubmitRcaPayload {
    pub root_cause: String,
    pub method: RcaMethod,
    #[serde(default)]
    pub systemic: bool,
    #[serde(default)]
    pub capa_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ApproveRcaPayload {
    pub approved: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SubmitResolutionPayload {
    #[serde(rename = "type", alias = "resolutionType")]
    pub resolution_type: ResolutionType,
    pub customer_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ClosePayload {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LinkRecordPayload {
    /// Expected kind of the target; checked against the id prefix when given.
    #[serde(default)]
    pub kind: Option<CaseKind>,
    pub id: CaseId,
    pub relation: Relation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UnlinkRecordPayload {
    pub id: CaseId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExtendSlaPayload {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub new_due_date: Timestamp,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OverridePriorityPayload {
    pub priority: Priority,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ArchivePayload {
    pub reason: String,
}

// ============================================================================
// COMMAND
// ============================================================================

/// A workflow command with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum Command {
    Triage(TriagePayload),
    Assign(AssignPayload),
    SubmitRca(SubmitRcaPayload),
    ApproveRca(ApproveRcaPayload),
    SubmitResolution(SubmitResolutionPayload),
    Close(ClosePayload),
    LinkRecord(LinkRecordPayload),
    UnlinkRecord(UnlinkRecordPayload),
    ExtendSla(ExtendSlaPayload),
    OverridePriority(OverridePriorityPayload),
    Archive(ArchivePayload),
}

impl Command {
    pub fn name(&self) -> CommandName {
        match self {
            Command::Triage(_) => CommandName::Triage,
            Command::Assign(_) => CommandName::Assign,
            Command::SubmitRca(_) => CommandName::SubmitRca,
            Command::ApproveRca(_) => CommandName::ApproveRca,
            Command::SubmitResolution(_) => CommandName::SubmitResolution,
            Command::Close(_) => CommandName::Close,
            Command::LinkRecord(_) => CommandName::LinkRecord,
            Command::UnlinkRecord(_) => CommandName::UnlinkRecord,
            Command::ExtendSla(_) => CommandName::ExtendSla,
            Command::OverridePriority(_) => CommandName::OverridePriority,
            Command::Archive(_) => CommandName::Archive,
        }
    }

    /// Parse from a command name and a JSON payload. A missing payload is
    /// treated as an empty object.
    pub fn from_parts(
        name: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        let payload = match payload {
            None | Some(serde_json::Value::Null) => serde_json::Value::Object(Default::default()),
            Some(value) => value,
        };
        serde_json::from_value(serde_json::json!({ "command": name, "payload": payload }))
    }
}

/// A command plus who sent it and its idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub command_id: CommandId,
    pub actor: ActorId,
    pub command: Command,
}

impl CommandEnvelope {
    /// Wrap a command under a fresh command id.
    pub fn new(actor: ActorId, command: Command) -> Self {
        Self {
            command_id: new_command_id(),
            actor,
            command,
        }
    }

    /// Wrap a command under a caller-chosen id, for retries.
    pub fn with_id(command_id: CommandId, actor: ActorId, command: Command) -> Self {
        Self {
            command_id,
            actor,
            command,
        }
    }
}
