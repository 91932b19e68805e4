use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Lucky Draw Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::draw_stream,
        crate::routes::draw::session,
        crate::routes::draw::start_draw,
        crate::routes::draw::cancel_draw,
        crate::routes::draw::press_key,
        crate::routes::pool::list_pool,
        crate::routes::pool::export_pool,
        crate::routes::pool::import_pool,
        crate::routes::pool::set_custom_names,
        crate::routes::pool::list_winners,
        crate::routes::pool::export_winners,
        crate::routes::pool::reset_winners,
        crate::routes::pool::list_forced_winners,
        crate::routes::pool::enqueue_forced_winners,
        crate::routes::pool::update_settings,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::draw::DrawModeDto,
            crate::dto::draw::DrawRequest,
            crate::dto::draw::ReelDto,
            crate::dto::draw::DrawStartedResponse,
            crate::dto::draw::ShortcutOutcome,
            crate::dto::draw::ShortcutResponse,
            crate::dto::draw::CancelDrawResponse,
            crate::dto::pool::EntrantDto,
            crate::dto::pool::WinnerDto,
            crate::dto::pool::PoolKindDto,
            crate::dto::pool::PoolResponse,
            crate::dto::pool::ImportResponse,
            crate::dto::pool::CustomNamesRequest,
            crate::dto::pool::CustomNamesResponse,
            crate::dto::pool::ForcedWinnersRequest,
            crate::dto::pool::ForcedWinnersResponse,
            crate::dto::pool::UpdateSettingsRequest,
            crate::dto::pool::SettingsDto,
            crate::dto::pool::ResetHistoryResponse,
            crate::dto::session::PhaseDto,
            crate::dto::session::SessionSummary,
            crate::dto::sse::Handshake,
            crate::dto::sse::DrawStartedEvent,
            crate::dto::sse::DrawCompletedEvent,
            crate::dto::sse::DrawCancelledEvent,
            crate::dto::sse::PoolUpdatedEvent,
            crate::dto::sse::WinnersResetEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "draw", description = "Draw requests and keyboard shortcuts"),
        (name = "pool", description = "Entrant pools, winners and operator settings"),
    )
)]
pub struct ApiDoc;
