//! Request and response bodies for the HTTP surface.

use caseflow_core::{
    ActorId, AuditEntry, CaseFilter, CaseId, CaseKind, CaseView, Category, LinkRef, NewCase,
    Phase, RejectedCommand, Severity,
};
use caseflow_workflow::CommandName;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// REQUESTS
// ============================================================================

/// Body of `POST /cases/{kind}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OpenCaseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    pub severity: Severity,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub owner: Option<ActorId>,
    #[serde(default, alias = "regulatorySignificance")]
    pub regulatory_flag: Option<bool>,
    /// Who is opening the case.
    pub actor: ActorId,
    /// Idempotency key; resubmitting it returns the case it opened.
    #[serde(default)]
    pub command_id: Option<Uuid>,
}

impl OpenCaseRequest {
    pub fn to_seed(&self) -> NewCase {
        NewCase {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            severity: self.severity,
            source: self.source.clone(),
            owner: self.owner.clone(),
            regulatory_flag: self.regulatory_flag,
        }
    }
}

/// Body of `POST /cases/{id}/commands`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(default)]
    pub command_id: Option<Uuid>,
    pub actor: ActorId,
    /// Command name, e.g. `triage` or `submit_rca`.
    pub command: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub payload: Option<serde_json::Value>,
}

/// Query string of `GET /cases`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct ListCasesQuery {
    pub kind: Option<CaseKind>,
    pub phase: Option<Phase>,
    #[cfg_attr(feature = "openapi", param(value_type = Option<String>))]
    pub assignee: Option<ActorId>,
    #[cfg_attr(feature = "openapi", param(value_type = Option<String>))]
    pub owner: Option<ActorId>,
    /// Include closed, rejected and archived cases.
    #[serde(default)]
    pub include_terminal: Option<bool>,
}

impl ListCasesQuery {
    pub fn to_filter(&self) -> CaseFilter {
        CaseFilter {
            kind: self.kind,
            phase: self.phase,
            assignee: self.assignee.clone(),
            owner: self.owner.clone(),
            include_terminal: self.include_terminal.unwrap_or(false),
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ListCasesResponse {
    pub cases: Vec<CaseView>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuditTrailResponse {
    pub case_id: CaseId,
    pub entries: Vec<AuditEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LinksResponse {
    pub case_id: CaseId,
    pub links: Vec<LinkRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RejectionsResponse {
    pub case_id: CaseId,
    pub rejections: Vec<RejectedCommand>,
}

/// Commands legal on a case right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LegalCommandsResponse {
    pub case_id: CaseId,
    pub status: String,
    pub commands: Vec<CommandName>,
}
