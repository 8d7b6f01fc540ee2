//! OpenAPI Specification for the Caseflow API
//!
//! Generated by utoipa from the route annotations and the schema derives on
//! the core and workflow types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{actors, cases, health};
use crate::types::*;

use caseflow_core::{
    ActorId, AuditEntry, Case, CaseId, CaseKind, CaseView, Category, LinkDirection, LinkRef,
    Phase, Priority, RcaMethod, RejectedCommand, Relation, ResolutionType, Severity, SlaStatus,
    TriageDecision,
};
use caseflow_workflow::{
    ActionItem, ApproveRcaPayload, ArchivePayload, AssignPayload, ClosePayload, CommandName,
    ExtendSlaPayload, InboxView, LinkRecordPayload, Notification, NotificationKind,
    OverridePriorityPayload, SubmitRcaPayload, SubmitResolutionPayload, TriagePayload,
    UnlinkRecordPayload,
};

/// OpenAPI document for the Caseflow API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caseflow API",
        version = "0.1.0",
        description = "Case lifecycle engine for complaints, CAPAs, audits, incidents and risks",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Cases", description = "Case creation, workflow commands, audit trail and links"),
        (name = "Actors", description = "Per-actor action items and notifications"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        cases::open_case,
        cases::execute_command,
        cases::get_case,
        cases::list_cases,
        cases::get_audit_trail,
        cases::get_links,
        cases::get_rejections,
        cases::get_legal_commands,
        actors::get_inbox,
        health::liveness,
        health::ping,
        health::readiness,
    ),
    components(schemas(
        // Errors
        ApiError,
        ErrorCode,
        // Requests and responses
        OpenCaseRequest,
        CommandRequest,
        ListCasesResponse,
        AuditTrailResponse,
        LinksResponse,
        RejectionsResponse,
        LegalCommandsResponse,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        // Case model
        CaseId,
        ActorId,
        Case,
        CaseView,
        CaseKind,
        Phase,
        Category,
        Severity,
        Priority,
        SlaStatus,
        RcaMethod,
        ResolutionType,
        TriageDecision,
        Relation,
        LinkDirection,
        LinkRef,
        AuditEntry,
        RejectedCommand,
        // Commands
        CommandName,
        TriagePayload,
        AssignPayload,
        SubmitRcaPayload,
        ApproveRcaPayload,
        SubmitResolutionPayload,
        ClosePayload,
        LinkRecordPayload,
        UnlinkRecordPayload,
        ExtendSlaPayload,
        OverridePriorityPayload,
        ArchivePayload,
        // Inbox
        InboxView,
        ActionItem,
        Notification,
        NotificationKind,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
