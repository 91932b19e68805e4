use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        draw::DrawModeDto,
        pool::{EntrantDto, PoolKindDto, SettingsDto},
    },
    state::session::DrawSession,
};

/// Draw machine phase as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDto {
    Idle,
    Drawing,
}

/// Read-only view of the draw session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    pub phase: PhaseDto,
    /// Pending draw, while drawing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_id: Option<Uuid>,
    /// Number of phase transitions since startup.
    pub version: usize,
    pub region: String,
    pub last_mode: DrawModeDto,
    pub active_pool: PoolKindDto,
    pub primary_count: usize,
    pub custom_count: usize,
    pub winner_count: usize,
    pub forced_count: usize,
    pub settings: SettingsDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_winner: Option<EntrantDto>,
}

impl From<&DrawSession> for SessionSummary {
    fn from(session: &DrawSession) -> Self {
        let snapshot = session.snapshot();
        Self {
            phase: if snapshot.drawing.is_some() {
                PhaseDto::Drawing
            } else {
                PhaseDto::Idle
            },
            draw_id: snapshot.drawing,
            version: snapshot.version,
            region: session.region().to_string(),
            last_mode: session.last_mode().into(),
            active_pool: session.active_source().0.into(),
            primary_count: session.primary().len(),
            custom_count: session.custom().pool().len(),
            winner_count: session.history().len(),
            forced_count: session.forced().len(),
            settings: session.settings().into(),
            current_winner: session.current_winner().map(EntrantDto::from),
        }
    }
}
