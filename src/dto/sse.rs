use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{
    draw::DrawStartedResponse,
    pool::{EntrantDto, PoolKindDto},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    pub stream: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast when a draw is accepted; carries the reel target.
pub struct DrawStartedEvent(pub DrawStartedResponse);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once the reel stops and the winner is committed.
pub struct DrawCompletedEvent {
    pub draw_id: Uuid,
    pub winner: EntrantDto,
    /// Pool the winner was removed from, if removal is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_from: Option<PoolKindDto>,
    pub play_sound: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a pending draw is cancelled.
pub struct DrawCancelledEvent {
    pub draw_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a pool's content changes.
pub struct PoolUpdatedEvent {
    pub pool: PoolKindDto,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the winner history changes outside a draw.
pub struct WinnersResetEvent {
    pub cleared: usize,
}
