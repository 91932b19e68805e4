//! DTO definitions for draw requests, keyboard shortcuts and their outcomes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    draw::DrawMode,
    reel::{ITEM_EXTENT, SPIN_CYCLES},
    session::DrawStart,
};

/// Region filter exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawModeDto {
    /// Every entrant.
    All,
    /// Entrants of the designated region.
    RegionA,
    /// Entrants outside the designated region.
    RegionB,
}

impl From<DrawMode> for DrawModeDto {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::All => DrawModeDto::All,
            DrawMode::RegionA => DrawModeDto::RegionA,
            DrawMode::RegionB => DrawModeDto::RegionB,
        }
    }
}

impl From<DrawModeDto> for DrawMode {
    fn from(mode: DrawModeDto) -> Self {
        match mode {
            DrawModeDto::All => DrawMode::All,
            DrawModeDto::RegionA => DrawMode::RegionA,
            DrawModeDto::RegionB => DrawMode::RegionB,
        }
    }
}

/// Request to start a draw. Without a mode the last used one applies.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DrawRequest {
    #[serde(default)]
    pub mode: Option<DrawModeDto>,
}

/// Scroll target handed to the renderer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReelDto {
    /// One shuffled cycle of names.
    pub spin_list: Vec<String>,
    /// Final scroll offset, in visual units.
    pub offset: u64,
    /// Visual extent of one name.
    pub item_extent: u64,
    /// Number of times the cycle repeats.
    pub cycles: usize,
    /// Landing index within one cycle.
    pub winner_index: usize,
}

/// Acknowledgement of an accepted draw. The winner is revealed on completion.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawStartedResponse {
    pub draw_id: Uuid,
    pub mode: DrawModeDto,
    pub reel: ReelDto,
    /// Delay before `draw.completed` is emitted.
    pub duration_ms: u64,
}

impl DrawStartedResponse {
    pub fn new(start: DrawStart, duration_ms: u64) -> Self {
        Self {
            draw_id: start.id,
            mode: start.mode.into(),
            reel: ReelDto {
                spin_list: start.reel.spin_list,
                offset: start.reel.offset,
                item_extent: ITEM_EXTENT,
                cycles: SPIN_CYCLES,
                winner_index: start.reel.winner_index,
            },
            duration_ms,
        }
    }
}

/// What happened to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutOutcome {
    /// A draw was started.
    Started,
    /// The key is not bound to anything.
    Ignored,
    /// The key is bound but the draw was refused.
    Rejected,
}

/// Result of `POST /keys/{key}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortcutResponse {
    pub outcome: ShortcutOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<DrawStartedResponse>,
}

/// Result of cancelling the pending draw.
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelDrawResponse {
    /// Identifier of the cancelled draw, absent when nothing was pending.
    pub cancelled: Option<Uuid>,
}
