use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::pool::{
        CustomNamesRequest, CustomNamesResponse, ForcedWinnersRequest, ForcedWinnersResponse,
        ImportQuery, ImportResponse, PoolResponse, ResetHistoryResponse, SettingsDto,
        UpdateSettingsRequest, WinnerDto,
    },
    error::AppError,
    services::pool_service,
    state::SharedState,
};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Pool, winner history and operator endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/pool", get(list_pool))
        .route("/pool/export", get(export_pool))
        .route("/pool/import", post(import_pool))
        .route("/custom-names", put(set_custom_names))
        .route("/winners", get(list_winners).delete(reset_winners))
        .route("/winners/export", get(export_winners))
        .route(
            "/forced-winners",
            get(list_forced_winners).post(enqueue_forced_winners),
        )
        .route("/settings", put(update_settings))
}

/// List both pools.
#[utoipa::path(
    get,
    path = "/pool",
    tag = "pool",
    responses((status = 200, description = "Primary pool and custom overlay", body = PoolResponse))
)]
pub async fn list_pool(State(state): State<SharedState>) -> Json<PoolResponse> {
    Json(pool_service::list_pool(&state).await)
}

/// Download the primary pool as CSV.
#[utoipa::path(
    get,
    path = "/pool/export",
    tag = "pool",
    responses((status = 200, description = "Primary pool", content_type = "text/csv", body = String))
)]
pub async fn export_pool(State(state): State<SharedState>) -> Result<impl IntoResponse, AppError> {
    let body = pool_service::export_pool_csv(&state).await?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], body))
}

/// Replace a pool with the rows of a CSV document sent as the request body.
#[utoipa::path(
    post,
    path = "/pool/import",
    tag = "pool",
    params(ImportQuery),
    request_body(content = String, content_type = "text/csv"),
    responses((status = 200, description = "Rows imported", body = ImportResponse))
)]
pub async fn import_pool(
    State(state): State<SharedState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    let target = query.target.unwrap_or_default();
    Ok(Json(pool_service::import_csv(&state, target, &body).await?))
}

/// Replace the custom-names text.
#[utoipa::path(
    put,
    path = "/custom-names",
    tag = "pool",
    request_body = CustomNamesRequest,
    responses((status = 200, description = "Overlay recomputed", body = CustomNamesResponse))
)]
pub async fn set_custom_names(
    State(state): State<SharedState>,
    Json(request): Json<CustomNamesRequest>,
) -> Json<CustomNamesResponse> {
    Json(pool_service::set_custom_names(&state, request.text).await)
}

/// List the winner history, oldest first.
#[utoipa::path(
    get,
    path = "/winners",
    tag = "pool",
    responses((status = 200, description = "Winner history", body = [WinnerDto]))
)]
pub async fn list_winners(State(state): State<SharedState>) -> Json<Vec<WinnerDto>> {
    Json(pool_service::list_winners(&state).await)
}

/// Download the winner history as CSV.
#[utoipa::path(
    get,
    path = "/winners/export",
    tag = "pool",
    responses((status = 200, description = "Winner history", content_type = "text/csv", body = String))
)]
pub async fn export_winners(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let body = pool_service::export_winners_csv(&state).await?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], body))
}

/// Clear the winner history.
#[utoipa::path(
    delete,
    path = "/winners",
    tag = "pool",
    responses(
        (status = 200, description = "History cleared", body = ResetHistoryResponse),
        (status = 409, description = "A draw is in progress")
    )
)]
pub async fn reset_winners(
    State(state): State<SharedState>,
) -> Result<Json<ResetHistoryResponse>, AppError> {
    Ok(Json(pool_service::reset_history(&state).await?))
}

/// Show the pending forced winners.
#[utoipa::path(
    get,
    path = "/forced-winners",
    tag = "pool",
    responses((status = 200, description = "Forced-winner queue", body = ForcedWinnersResponse))
)]
pub async fn list_forced_winners(State(state): State<SharedState>) -> Json<ForcedWinnersResponse> {
    Json(pool_service::forced_winners(&state).await)
}

/// Queue forced winners, consumed one per draw.
#[utoipa::path(
    post,
    path = "/forced-winners",
    tag = "pool",
    request_body = ForcedWinnersRequest,
    responses(
        (status = 200, description = "Names queued", body = ForcedWinnersResponse),
        (status = 400, description = "Blank or oversized names")
    )
)]
pub async fn enqueue_forced_winners(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<ForcedWinnersRequest>>,
) -> Json<ForcedWinnersResponse> {
    Json(pool_service::enqueue_forced(&state, &request.names).await)
}

/// Update operator toggles.
#[utoipa::path(
    put,
    path = "/settings",
    tag = "pool",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Settings after the update", body = SettingsDto))
)]
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Json<SettingsDto> {
    Json(pool_service::update_settings(&state, request).await)
}
