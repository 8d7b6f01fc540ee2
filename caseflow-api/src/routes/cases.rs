//! Case REST API Routes
//!
//! Opening cases, issuing workflow commands, and the read endpoints over a
//! single case (view, audit trail, links, refused commands).

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use caseflow_core::{CaseId, CaseKind};
use caseflow_workflow::{Command, CommandEnvelope};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{
        AuditTrailResponse, CommandRequest, LegalCommandsResponse, LinksResponse,
        ListCasesQuery, ListCasesResponse, OpenCaseRequest, RejectionsResponse,
    },
};

fn parse_case_id(raw: &str) -> ApiResult<CaseId> {
    Ok(CaseId::parse(raw)?)
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /cases/{kind} - Open a new case
#[utoipa::path(
    post,
    path = "/cases/{kind}",
    tag = "Cases",
    params(
        ("kind" = String, Path, description = "Case kind: complaint, capa, audit, incident or risk")
    ),
    request_body = OpenCaseRequest,
    responses(
        (status = 201, description = "Case opened", body = caseflow_core::CaseView),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
)]
pub async fn open_case(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    payload: Result<Json<OpenCaseRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let kind = CaseKind::from_db_str(&kind).map_err(|e| ApiError::invalid_input(e.to_string()))?;
    let Json(req) = payload?;

    let view = state
        .engine
        .open_case(kind, &req.to_seed(), &req.actor, req.command_id)?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /cases/{id}/commands - Apply a workflow command
#[utoipa::path(
    post,
    path = "/cases/{id}/commands",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case ID, e.g. CMP-2025-0001")
    ),
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command applied", body = caseflow_core::CaseView),
        (status = 400, description = "Invalid command or payload", body = ApiError),
        (status = 404, description = "Case or link not found", body = ApiError),
        (status = 409, description = "Illegal transition or concurrent modification", body = ApiError),
        (status = 500, description = "Case in an invalid state", body = ApiError),
    ),
)]
pub async fn execute_command(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let case_id = parse_case_id(&id)?;
    let Json(req) = payload?;

    let command = Command::from_parts(&req.command, req.payload)?;
    let envelope = match req.command_id {
        Some(command_id) => CommandEnvelope::with_id(command_id, req.actor, command),
        None => CommandEnvelope::new(req.actor, command),
    };

    let outcome = state.engine.execute(&case_id, envelope)?;
    Ok(Json(outcome.view))
}

/// GET /cases/{id} - Case with live SLA status
#[utoipa::path(
    get,
    path = "/cases/{id}",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case ID")
    ),
    responses(
        (status = 200, description = "Case found", body = caseflow_core::CaseView),
        (status = 404, description = "Case not found", body = ApiError),
    ),
)]
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let case_id = parse_case_id(&id)?;
    Ok(Json(state.engine.view(&case_id)?))
}

/// GET /cases - List cases
#[utoipa::path(
    get,
    path = "/cases",
    tag = "Cases",
    params(ListCasesQuery),
    responses(
        (status = 200, description = "Matching cases", body = ListCasesResponse),
        (status = 400, description = "Invalid filter", body = ApiError),
    ),
)]
pub async fn list_cases(
    State(state): State<AppState>,
    query: Result<Query<ListCasesQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let cases = state.engine.list(&query.to_filter())?;
    let total = cases.len();
    Ok(Json(ListCasesResponse { cases, total }))
}

/// GET /cases/{id}/audit - Ordered audit trail
#[utoipa::path(
    get,
    path = "/cases/{id}/audit",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case ID")
    ),
    responses(
        (status = 200, description = "Audit entries, oldest first", body = AuditTrailResponse),
        (status = 404, description = "Case not found", body = ApiError),
    ),
)]
pub async fn get_audit_trail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let case_id = parse_case_id(&id)?;
    let trail = state.engine.audit_trail(&case_id)?;
    Ok(Json(AuditTrailResponse {
        case_id,
        entries: trail.iter().cloned().collect(),
    }))
}

/// GET /cases/{id}/links - Linked records
#[utoipa::path(
    get,
    path = "/cases/{id}/links",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case ID")
    ),
    responses(
        (status = 200, description = "Links of the case", body = LinksResponse),
        (status = 404, description = "Case not found", body = ApiError),
    ),
)]
pub async fn get_links(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let case_id = parse_case_id(&id)?;
    let links = state.engine.links_of(&case_id)?;
    Ok(Json(LinksResponse { case_id, links }))
}

/// GET /cases/{id}/rejections - Refused commands
#[utoipa::path(
    get,
    path = "/cases/{id}/rejections",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case ID")
    ),
    responses(
        (status = 200, description = "Refused command attempts", body = RejectionsResponse),
        (status = 404, description = "Case not found", body = ApiError),
    ),
)]
pub async fn get_rejections(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let case_id = parse_case_id(&id)?;
    let rejections = state.engine.rejections(&case_id)?;
    Ok(Json(RejectionsResponse {
        case_id,
        rejections,
    }))
}

/// GET /cases/{id}/commands - Commands legal in the current state
#[utoipa::path(
    get,
    path = "/cases/{id}/commands",
    tag = "Cases",
    params(
        ("id" = String, Path, description = "Case ID")
    ),
    responses(
        (status = 200, description = "Legal commands", body = LegalCommandsResponse),
        (status = 404, description = "Case not found", body = ApiError),
    ),
)]
pub async fn get_legal_commands(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let case_id = parse_case_id(&id)?;
    let view = state.engine.view(&case_id)?;
    let commands = state.engine.legal_commands(&case_id)?;
    Ok(Json(LegalCommandsResponse {
        case_id,
        status: view.case.status.label().to_string(),
        commands,
    }))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Routes nested under `/cases`. `POST /:id` takes a kind rather than an id;
/// the segment shares one name so both methods live on the same route.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_cases))
        .route("/:id", get(get_case).post(open_case))
        .route("/:id/commands", get(get_legal_commands).post(execute_command))
        .route("/:id/audit", get(get_audit_trail))
        .route("/:id/links", get(get_links))
        .route("/:id/rejections", get(get_rejections))
        .with_state(state)
}
