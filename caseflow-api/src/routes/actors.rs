//! Actor inbox route: action items and notifications for one person.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use caseflow_core::ActorId;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// GET /actors/{actor}/inbox - What the actor must do next
#[utoipa::path(
    get,
    path = "/actors/{actor}/inbox",
    tag = "Actors",
    params(
        ("actor" = String, Path, description = "Actor name")
    ),
    responses(
        (status = 200, description = "Action items and notifications", body = caseflow_workflow::InboxView),
        (status = 400, description = "Blank actor", body = ApiError),
    ),
)]
pub async fn get_inbox(
    State(state): State<AppState>,
    Path(actor): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let actor = ActorId::new(actor)?;
    let inbox = state.engine.inbox(&actor)?;
    tracing::debug!(
        %actor,
        action_items = inbox.action_items.len(),
        notifications = inbox.notifications.len(),
        "Inbox projected"
    );
    Ok(Json(inbox))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/:actor/inbox", get(get_inbox))
        .with_state(state)
}
