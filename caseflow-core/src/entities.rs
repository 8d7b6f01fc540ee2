//! Core entity structures

use crate::{
    sla, ActorId, AuditEntryId, CaseId, CaseKind, CaseStatus, Category, CommandId, Phase,
    Priority, RcaMethod, Relation, ResolutionType, Severity, SlaStatus, Timestamp,
    ValidationError, WorkflowError,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// CASE
// ============================================================================

/// Case - any workflow-tracked record (complaint, CAPA, audit, incident, risk).
///
/// `status` is always a status of `kind`. Mutation goes through the case
/// store, which emits one audit entry per changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub kind: CaseKind,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub status: CaseStatus,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub severity: Severity,
    pub priority: Priority,
    pub priority_overridden: bool,
    pub source: Option<String>,
    pub owner: Option<ActorId>,
    pub assignee: Option<ActorId>,
    pub regulatory_flag: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,

    // Stage timestamps, each set at most once.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub acknowledged_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub investigation_started_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub rca_submitted_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub rca_approved_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub resolved_at: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub closed_at: Option<Timestamp>,

    /// Present for every case created through the store.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub sla_due_date: Option<Timestamp>,

    // Investigation and resolution details
    pub root_cause: Option<String>,
    pub rca_method: Option<RcaMethod>,
    pub systemic: Option<bool>,
    pub capa_required: Option<bool>,
    pub resolution_type: Option<ResolutionType>,
    pub customer_message: Option<String>,
    pub rejection_reason: Option<String>,
    pub archived_reason: Option<String>,
    pub info_request_count: u32,

    /// Bumped on every applied change set.
    pub version: u64,
}

impl Case {
    /// Build a fresh case in its kind's initial status.
    pub fn open(id: CaseId, seed: &NewCase, now: Timestamp, sla_due_date: Timestamp) -> Self {
        let kind = id.kind();
        let regulatory_flag = crate::policy::resolve_regulatory_flag(
            seed.regulatory_flag,
            false,
            seed.category,
            seed.severity,
        );
        Self {
            id,
            kind,
            status: CaseStatus::initial(kind),
            title: seed.title.trim().to_string(),
            description: seed.description.clone(),
            category: seed.category,
            severity: seed.severity,
            priority: crate::policy::priority_for(seed.severity),
            priority_overridden: false,
            source: seed.source.clone(),
            owner: seed.owner.clone(),
            assignee: None,
            regulatory_flag,
            created_at: now,
            updated_at: now,
            acknowledged_at: None,
            investigation_started_at: None,
            rca_submitted_at: None,
            rca_approved_at: None,
            resolved_at: None,
            closed_at: None,
            sla_due_date: Some(sla_due_date),
            root_cause: None,
            rca_method: None,
            systemic: None,
            capa_required: None,
            resolution_type: None,
            customer_message: None,
            rejection_reason: None,
            archived_reason: None,
            info_request_count: 0,
            version: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.status.phase()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Live SLA status.
    ///
    /// Resolved and closed cases are frozen at the moment they were resolved
    /// (or closed). Rejected and archived cases report none.
    pub fn sla_status(
        &self,
        now: Timestamp,
        window: Duration,
    ) -> Result<Option<SlaStatus>, WorkflowError> {
        let at = match self.phase() {
            Phase::Rejected | Phase::Archived => return Ok(None),
            Phase::Resolved | Phase::Closed => self.resolved_at.or(self.closed_at).unwrap_or(now),
            _ => now,
        };
        sla::evaluate(self.sla_due_date, at, window)
            .map(Some)
            .map_err(|_| WorkflowError::InvalidState {
                reason: format!("case {} has no SLA due date", self.id),
            })
    }

    /// Check structural invariants of a stored case.
    pub fn check_integrity(&self) -> Result<(), WorkflowError> {
        if self.status.kind() != self.kind || self.id.kind() != self.kind {
            return Err(WorkflowError::InvalidState {
                reason: format!("case {} carries a status of another kind", self.id),
            });
        }
        if !self.is_terminal() && self.sla_due_date.is_none() {
            return Err(WorkflowError::InvalidState {
                reason: format!("active case {} has no SLA due date", self.id),
            });
        }
        Ok(())
    }

    /// Read a single field.
    pub fn field(&self, field: CaseField) -> FieldValue {
        use FieldValue as V;
        match field {
            CaseField::Status => V::Status(self.status),
            CaseField::Title => V::Text(self.title.clone()),
            CaseField::Description => V::from_text(&self.description),
            CaseField::Category => V::Category(self.category),
            CaseField::Severity => V::Severity(self.severity),
            CaseField::Priority => V::Priority(self.priority),
            CaseField::PriorityOverridden => V::Bool(self.priority_overridden),
            CaseField::Source => V::from_text(&self.source),
            CaseField::Owner => V::from_actor(&self.owner),
            CaseField::Assignee => V::from_actor(&self.assignee),
            CaseField::RegulatoryFlag => V::Bool(self.regulatory_flag),
            CaseField::AcknowledgedAt => V::from_time(self.acknowledged_at),
            CaseField::InvestigationStartedAt => V::from_time(self.investigation_started_at),
            CaseField::RcaSubmittedAt => V::from_time(self.rca_submitted_at),
            CaseField::RcaApprovedAt => V::from_time(self.rca_approved_at),
            CaseField::ResolvedAt => V::from_time(self.resolved_at),
            CaseField::ClosedAt => V::from_time(self.closed_at),
            CaseField::SlaDueDate => V::from_time(self.sla_due_date),
            CaseField::RootCause => V::from_text(&self.root_cause),
            CaseField::RcaMethod => self.rca_method.map_or(V::Null, V::RcaMethod),
            CaseField::Systemic => self.systemic.map_or(V::Null, V::Bool),
            CaseField::CapaRequired => self.capa_required.map_or(V::Null, V::Bool),
            CaseField::ResolutionType => self.resolution_type.map_or(V::Null, V::ResolutionType),
            CaseField::CustomerMessage => V::from_text(&self.customer_message),
            CaseField::RejectionReason => V::from_text(&self.rejection_reason),
            CaseField::ArchivedReason => V::from_text(&self.archived_reason),
            CaseField::InfoRequestCount => V::Count(self.info_request_count),
        }
    }

    /// Write a single field. Fails if the value has the wrong shape for the
    /// field, if a required field would be cleared, or if a status of
    /// another kind is given.
    pub fn set_field(&mut self, field: CaseField, value: FieldValue) -> Result<(), ValidationError> {
        use FieldValue as V;
        let mismatch = |value: &FieldValue| {
            ValidationError::invalid(field.as_str(), format!("unexpected value {:?}", value))
        };

        match (field, value) {
            (CaseField::Status, V::Status(status)) => {
                if status.kind() != self.kind {
                    return Err(ValidationError::invalid(
                        "status",
                        format!("'{}' is not a {} status", status, self.kind),
                    ));
                }
                self.status = status;
            }
            (CaseField::Title, V::Text(text)) => self.title = text,
            (CaseField::Description, v) => self.description = v.into_text().map_err(|v| mismatch(&v))?,
            (CaseField::Category, V::Category(c)) => self.category = c,
            (CaseField::Severity, V::Severity(s)) => self.severity = s,
            (CaseField::Priority, V::Priority(p)) => self.priority = p,
            (CaseField::PriorityOverridden, V::Bool(b)) => self.priority_overridden = b,
            (CaseField::Source, v) => self.source = v.into_text().map_err(|v| mismatch(&v))?,
            (CaseField::Owner, v) => self.owner = v.into_actor().map_err(|v| mismatch(&v))?,
            (CaseField::Assignee, v) => self.assignee = v.into_actor().map_err(|v| mismatch(&v))?,
            (CaseField::RegulatoryFlag, V::Bool(b)) => self.regulatory_flag = b,
            (CaseField::AcknowledgedAt, v) => {
                self.acknowledged_at = v.into_time().map_err(|v| mismatch(&v))?
            }
            (CaseField::InvestigationStartedAt, v) => {
                self.investigation_started_at = v.into_time().map_err(|v| mismatch(&v))?
            }
            (CaseField::RcaSubmittedAt, v) => {
                self.rca_submitted_at = v.into_time().map_err(|v| mismatch(&v))?
            }
            (CaseField::RcaApprovedAt, v) => {
                self.rca_approved_at = v.into_time().map_err(|v| mismatch(&v))?
            }
            (CaseField::ResolvedAt, v) => self.resolved_at = v.into_time().map_err(|v| mismatch(&v))?,
            (CaseField::ClosedAt, v) => self.closed_at = v.into_time().map_err(|v| mismatch(&v))?,
            (CaseField::SlaDueDate, V::Time(t)) => self.sla_due_date = Some(t),
            (CaseField::RootCause, v) => self.root_cause = v.into_text().map_err(|v| mismatch(&v))?,
            (CaseField::RcaMethod, V::RcaMethod(m)) => self.rca_method = Some(m),
            (CaseField::RcaMethod, V::Null) => self.rca_method = None,
            (CaseField::Systemic, V::Bool(b)) => self.systemic = Some(b),
            (CaseField::Systemic, V::Null) => self.systemic = None,
            (CaseField::CapaRequired, V::Bool(b)) => self.capa_required = Some(b),
            (CaseField::CapaRequired, V::Null) => self.capa_required = None,
            (CaseField::ResolutionType, V::ResolutionType(r)) => self.resolution_type = Some(r),
            (CaseField::ResolutionType, V::Null) => self.resolution_type = None,
            (CaseField::CustomerMessage, v) => {
                self.customer_message = v.into_text().map_err(|v| mismatch(&v))?
            }
            (CaseField::RejectionReason, v) => {
                self.rejection_reason = v.into_text().map_err(|v| mismatch(&v))?
            }
            (CaseField::ArchivedReason, v) => {
                self.archived_reason = v.into_text().map_err(|v| mismatch(&v))?
            }
            (CaseField::InfoRequestCount, V::Count(n)) => self.info_request_count = n,
            (_, v) => return Err(mismatch(&v)),
        }
        Ok(())
    }
}

// ============================================================================
// FIELDS AND VALUES
// ============================================================================

/// Every audited field of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseField {
    Status,
    Title,
    Description,
    Category,
    Severity,
    Priority,
    PriorityOverridden,
    Source,
    Owner,
    Assignee,
    RegulatoryFlag,
    AcknowledgedAt,
    InvestigationStartedAt,
    RcaSubmittedAt,
    RcaApprovedAt,
    ResolvedAt,
    ClosedAt,
    SlaDueDate,
    RootCause,
    RcaMethod,
    Systemic,
    CapaRequired,
    ResolutionType,
    CustomerMessage,
    RejectionReason,
    ArchivedReason,
    InfoRequestCount,
}

impl CaseField {
    /// Fields recorded in the audit trail when a case is opened.
    pub const INITIAL: &'static [CaseField] = &[
        CaseField::Status,
        CaseField::Title,
        CaseField::Description,
        CaseField::Category,
        CaseField::Severity,
        CaseField::Priority,
        CaseField::Source,
        CaseField::Owner,
        CaseField::RegulatoryFlag,
        CaseField::SlaDueDate,
    ];

    /// Name as written to the audit trail.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseField::Status => "status",
            CaseField::Title => "title",
            CaseField::Description => "description",
            CaseField::Category => "category",
            CaseField::Severity => "severity",
            CaseField::Priority => "priority",
            CaseField::PriorityOverridden => "priorityOverridden",
            CaseField::Source => "source",
            CaseField::Owner => "owner",
            CaseField::Assignee => "assignee",
            CaseField::RegulatoryFlag => "regulatoryFlag",
            CaseField::AcknowledgedAt => "acknowledgedAt",
            CaseField::InvestigationStartedAt => "investigationStartedAt",
            CaseField::RcaSubmittedAt => "rcaSubmittedAt",
            CaseField::RcaApprovedAt => "rcaApprovedAt",
            CaseField::ResolvedAt => "resolvedAt",
            CaseField::ClosedAt => "closedAt",
            CaseField::SlaDueDate => "slaDueDate",
            CaseField::RootCause => "rootCause",
            CaseField::RcaMethod => "rcaMethod",
            CaseField::Systemic => "systemic",
            CaseField::CapaRequired => "capaRequired",
            CaseField::ResolutionType => "resolutionType",
            CaseField::CustomerMessage => "customerMessage",
            CaseField::RejectionReason => "rejectionReason",
            CaseField::ArchivedReason => "archivedReason",
            CaseField::InfoRequestCount => "infoRequestCount",
        }
    }

    /// Stage timestamps are written once and never cleared.
    pub fn is_stage_timestamp(&self) -> bool {
        matches!(
            self,
            CaseField::AcknowledgedAt
                | CaseField::InvestigationStartedAt
                | CaseField::RcaSubmittedAt
                | CaseField::RcaApprovedAt
                | CaseField::ResolvedAt
                | CaseField::ClosedAt
        )
    }
}

impl fmt::Display for CaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed value of a single case field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Text(String),
    Bool(bool),
    Count(u32),
    Time(Timestamp),
    Actor(ActorId),
    Status(CaseStatus),
    Category(Category),
    Severity(Severity),
    Priority(Priority),
    RcaMethod(RcaMethod),
    ResolutionType(ResolutionType),
}

impl FieldValue {
    fn from_text(value: &Option<String>) -> Self {
        value.clone().map_or(FieldValue::Null, FieldValue::Text)
    }

    fn from_actor(value: &Option<ActorId>) -> Self {
        value.clone().map_or(FieldValue::Null, FieldValue::Actor)
    }

    fn from_time(value: Option<Timestamp>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Time)
    }

    fn into_text(self) -> Result<Option<String>, FieldValue> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Text(t) => Ok(Some(t)),
            other => Err(other),
        }
    }

    fn into_actor(self) -> Result<Option<ActorId>, FieldValue> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Actor(a) => Ok(Some(a)),
            other => Err(other),
        }
    }

    fn into_time(self) -> Result<Option<Timestamp>, FieldValue> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Time(t) => Ok(Some(t)),
            other => Err(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Audit trail rendering; `None` for null.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(t) => Some(t.clone()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Count(n) => Some(n.to_string()),
            FieldValue::Time(t) => Some(t.to_rfc3339()),
            FieldValue::Actor(a) => Some(a.to_string()),
            FieldValue::Status(s) => Some(s.to_string()),
            FieldValue::Category(c) => Some(c.to_string()),
            FieldValue::Severity(s) => Some(s.to_string()),
            FieldValue::Priority(p) => Some(p.to_string()),
            FieldValue::RcaMethod(m) => Some(m.to_string()),
            FieldValue::ResolutionType(r) => Some(r.to_string()),
        }
    }
}

/// One requested field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDelta {
    pub field: CaseField,
    pub value: FieldValue,
}

impl FieldDelta {
    pub fn new(field: CaseField, value: FieldValue) -> Self {
        Self { field, value }
    }
}

/// Seed fields for opening a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    pub severity: Severity,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub owner: Option<ActorId>,
    /// Regulatory significance claimed at intake; the forcing rule still applies.
    #[serde(default)]
    pub regulatory_flag: Option<bool>,
}

impl NewCase {
    pub fn new(title: impl Into<String>, category: Category, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: None,
            category,
            severity,
            source: None,
            owner: None,
            regulatory_flag: None,
        }
    }

    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::missing("title"));
        }
        Ok(())
    }
}

// ============================================================================
// AUDIT
// ============================================================================

/// Immutable record of one field-level change, or of a non-field action
/// such as linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub entry_id: AuditEntryId,
    pub case_id: CaseId,
    /// Command that produced the entry, if any.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub command_id: Option<CommandId>,
    pub action: String,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub performed_by: ActorId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub performed_at: Timestamp,
    /// Position in the case's trail, assigned on append.
    pub sequence: u64,
}

impl AuditEntry {
    pub fn new(
        case_id: CaseId,
        action: impl Into<String>,
        performed_by: ActorId,
        performed_at: Timestamp,
    ) -> Self {
        Self {
            entry_id: Uuid::now_v7(),
            case_id,
            command_id: None,
            action: action.into(),
            field: None,
            old_value: None,
            new_value: None,
            performed_by,
            performed_at,
            sequence: 0,
        }
    }

    pub fn with_command(mut self, command_id: Option<CommandId>) -> Self {
        self.command_id = command_id;
        self
    }

    pub fn with_change(
        mut self,
        field: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        self.field = Some(field.into());
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    /// Reject entries with no action, or values without a field name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.action.trim().is_empty() {
            return Err(ValidationError::missing("action"));
        }
        match &self.field {
            Some(field) if field.trim().is_empty() => Err(ValidationError::missing("field")),
            None if self.old_value.is_some() || self.new_value.is_some() => {
                Err(ValidationError::missing("field"))
            }
            _ => Ok(()),
        }
    }
}

/// A command that was refused. Kept apart from the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RejectedCommand {
    pub case_id: CaseId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub command_id: Option<CommandId>,
    pub command: String,
    pub actor: ActorId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub status: Option<CaseStatus>,
    pub reason: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub attempted_at: Timestamp,
}

// ============================================================================
// LINKS
// ============================================================================

/// Typed association between two cases. Stored once, visible from both ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub from_id: CaseId,
    pub from_kind: CaseKind,
    pub to_id: CaseId,
    pub to_kind: CaseKind,
    pub relation: Relation,
}

impl Link {
    pub fn new(from_id: CaseId, to_id: CaseId, relation: Relation) -> Self {
        Self {
            from_kind: from_id.kind(),
            to_kind: to_id.kind(),
            from_id,
            to_id,
            relation,
        }
    }

    /// True if this link joins `a` and `b` in either direction.
    pub fn joins(&self, a: &CaseId, b: &CaseId) -> bool {
        (&self.from_id == a && &self.to_id == b) || (&self.from_id == b && &self.to_id == a)
    }

    /// The link as seen from `id`, if `id` is an endpoint.
    pub fn view_from(&self, id: &CaseId) -> Option<LinkRef> {
        if &self.from_id == id {
            Some(LinkRef {
                other_id: self.to_id.clone(),
                other_kind: self.to_kind,
                relation: self.relation,
                direction: LinkDirection::Outgoing,
            })
        } else if &self.to_id == id {
            Some(LinkRef {
                other_id: self.from_id.clone(),
                other_kind: self.from_kind,
                relation: self.relation,
                direction: LinkDirection::Incoming,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    Outgoing,
    Incoming,
}

/// A link from the point of view of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LinkRef {
    pub other_id: CaseId,
    pub other_kind: CaseKind,
    pub relation: Relation,
    pub direction: LinkDirection,
}

// ============================================================================
// VIEWS AND FILTERS
// ============================================================================

/// Case as returned to callers: stored fields plus live SLA and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CaseView {
    #[serde(flatten)]
    pub case: Case,
    pub sla_status: Option<SlaStatus>,
    pub links: Vec<LinkRef>,
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    pub kind: Option<CaseKind>,
    pub phase: Option<Phase>,
    pub assignee: Option<ActorId>,
    pub owner: Option<ActorId>,
    #[serde(default)]
    pub include_terminal: bool,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.kind.map_or(true, |k| case.kind == k)
            && self.phase.map_or(true, |p| case.phase() == p)
            && self
                .assignee
                .as_ref()
                .map_or(true, |a| case.assignee.as_ref() == Some(a))
            && self
                .owner
                .as_ref()
                .map_or(true, |o| case.owner.as_ref() == Some(o))
            && (self.include_terminal || self.phase.is_some() || !case.is_terminal())
    }
}
