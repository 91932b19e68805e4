use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        draw::{CancelDrawResponse, DrawRequest, DrawStartedResponse, ShortcutResponse},
        session::SessionSummary,
    },
    error::AppError,
    services::draw_service,
    state::{SharedState, draw::DrawMode},
};

/// Draw control endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/session", get(session))
        .route("/draw", post(start_draw).delete(cancel_draw))
        .route("/keys/{key}", post(press_key))
}

/// Summarise the draw session.
#[utoipa::path(
    get,
    path = "/session",
    tag = "draw",
    responses((status = 200, description = "Current session state", body = SessionSummary))
)]
pub async fn session(State(state): State<SharedState>) -> Json<SessionSummary> {
    Json(draw_service::session_summary(&state).await)
}

/// Start a draw; the winner is announced on the SSE stream once the reel stops.
#[utoipa::path(
    post,
    path = "/draw",
    tag = "draw",
    request_body = DrawRequest,
    responses(
        (status = 202, description = "Draw accepted", body = DrawStartedResponse),
        (status = 409, description = "A draw is already in progress"),
        (status = 422, description = "No names in the list")
    )
)]
pub async fn start_draw(
    State(state): State<SharedState>,
    request: Option<Json<DrawRequest>>,
) -> Result<(StatusCode, Json<DrawStartedResponse>), AppError> {
    let started = draw_service::request_draw(&state, requested_mode(request)).await?;
    Ok((StatusCode::ACCEPTED, Json(started)))
}

/// Mode named by the body; an absent body or mode repeats the last one.
fn requested_mode(request: Option<Json<DrawRequest>>) -> Option<DrawMode> {
    request
        .and_then(|Json(request)| request.mode)
        .map(Into::into)
}

/// Cancel the pending draw without committing a winner.
#[utoipa::path(
    delete,
    path = "/draw",
    tag = "draw",
    responses((status = 200, description = "Pending draw cancelled, if any", body = CancelDrawResponse))
)]
pub async fn cancel_draw(State(state): State<SharedState>) -> Json<CancelDrawResponse> {
    Json(CancelDrawResponse {
        cancelled: draw_service::cancel_pending_draw(&state).await,
    })
}

/// Forward a key press: `1`, `2`, `3` or `Space`.
#[utoipa::path(
    post,
    path = "/keys/{key}",
    tag = "draw",
    params(("key" = String, Path, description = "Key name as reported by the renderer")),
    responses((status = 200, description = "Outcome of the key press", body = ShortcutResponse))
)]
pub async fn press_key(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Json<ShortcutResponse>, AppError> {
    Ok(Json(draw_service::request_shortcut(&state, &key).await?))
}
