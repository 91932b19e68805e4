use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        draw::DrawStartedResponse,
        pool::{EntrantDto, PoolKindDto},
        sse::{
            DrawCancelledEvent, DrawCompletedEvent, DrawStartedEvent, PoolUpdatedEvent,
            ServerEvent, WinnersResetEvent,
        },
    },
    state::{SharedState, session::DrawCompletion, state_machine::PoolKind},
};

const EVENT_DRAW_STARTED: &str = "draw.started";
const EVENT_DRAW_COMPLETED: &str = "draw.completed";
const EVENT_DRAW_CANCELLED: &str = "draw.cancelled";
const EVENT_POOL_UPDATED: &str = "pool.updated";
const EVENT_WINNERS_RESET: &str = "winners.reset";

/// Broadcast an accepted draw and its reel target.
pub fn broadcast_draw_started(state: &SharedState, started: &DrawStartedResponse) {
    let payload = DrawStartedEvent(started.clone());
    send_event(state, EVENT_DRAW_STARTED, &payload);
}

/// Broadcast the committed winner of a draw.
pub fn broadcast_draw_completed(state: &SharedState, completion: &DrawCompletion) {
    let payload = DrawCompletedEvent {
        draw_id: completion.id,
        winner: EntrantDto::from(&completion.record.entrant),
        removed_from: completion.removed_from.map(PoolKindDto::from),
        play_sound: completion.play_sound,
    };
    send_event(state, EVENT_DRAW_COMPLETED, &payload);
}

/// Broadcast that the pending draw was dropped.
pub fn broadcast_draw_cancelled(state: &SharedState, draw_id: Uuid) {
    send_event(state, EVENT_DRAW_CANCELLED, &DrawCancelledEvent { draw_id });
}

/// Broadcast the new size of a pool.
pub fn broadcast_pool_updated(state: &SharedState, pool: PoolKind, count: usize) {
    let payload = PoolUpdatedEvent {
        pool: pool.into(),
        count,
    };
    send_event(state, EVENT_POOL_UPDATED, &payload);
}

/// Broadcast that the winner history was cleared.
pub fn broadcast_winners_reset(state: &SharedState, cleared: usize) {
    send_event(state, EVENT_WINNERS_RESET, &WinnersResetEvent { cleared });
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
