//! The draw session: owned pools, history, forced-winner queue and draw phase.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::state::{
    draw::{self, DrawMode, ForcedWinnerQueue, SelectionPath},
    entrant::{Entrant, WinnerRecord},
    pool::{CustomOverlay, EntrantPool},
    random::RandomSource,
    reel::{self, ReelTarget},
    state_machine::{
        DrawEvent, DrawId, DrawPhase, DrawStateMachine, DrawTicket, InvalidTransition, PoolKind,
        Snapshot, TransitionError,
    },
};

/// Reasons a draw request is turned down without any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrawRejected {
    /// The active pool has no entrant.
    #[error("no names in the list")]
    EmptyPool,
    /// Another draw is still spinning.
    #[error("a draw is already in progress")]
    AlreadyDrawing,
}

/// Operator toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSettings {
    /// Remove each winner from the pool it was drawn from.
    pub remove_winner: bool,
    /// Draw from the custom-names overlay when it is not empty.
    pub use_custom_names: bool,
    /// Ask the renderer to play the celebration sound.
    pub enable_sound: bool,
}

/// Result of an accepted draw request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawStart {
    /// Identifier the completion must present.
    pub id: DrawId,
    /// Region filter used.
    pub mode: DrawMode,
    /// Reel scroll target for the renderer.
    pub reel: ReelTarget,
    /// How the winner was chosen. Not exposed to viewers.
    pub path: SelectionPath,
}

/// Mutations committed when a draw completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCompletion {
    /// Identifier of the completed draw.
    pub id: DrawId,
    /// Region filter the draw was requested with.
    pub mode: DrawMode,
    /// Time spent in the drawing phase.
    pub elapsed: Duration,
    /// The appended history entry.
    pub record: WinnerRecord,
    /// Pool the winner was removed from, if removal happened.
    pub removed_from: Option<PoolKind>,
    /// Renderer hint from [`SessionSettings::enable_sound`].
    pub play_sound: bool,
}

/// Explicit owner of all draw state. Every operation goes through `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct DrawSession {
    primary: EntrantPool,
    custom: CustomOverlay,
    history: Vec<WinnerRecord>,
    forced: ForcedWinnerQueue,
    settings: SessionSettings,
    region: String,
    last_mode: DrawMode,
    current_winner: Option<Entrant>,
    machine: DrawStateMachine,
}

impl DrawSession {
    /// Empty session filtering regions against `region`.
    pub fn new(region: impl Into<String>, settings: SessionSettings) -> Self {
        Self {
            region: region.into(),
            settings,
            ..Self::default()
        }
    }

    /// Reinstall durable state loaded at startup.
    pub fn restore(
        &mut self,
        primary: Vec<Entrant>,
        history: Vec<WinnerRecord>,
        custom: Vec<Entrant>,
    ) {
        self.primary = EntrantPool::new(primary);
        self.history = history;
        self.custom = CustomOverlay::from_entrants(custom);
    }

    /// Primary pool.
    pub fn primary(&self) -> &EntrantPool {
        &self.primary
    }

    /// Custom-names overlay.
    pub fn custom(&self) -> &CustomOverlay {
        &self.custom
    }

    /// Winner history, oldest first.
    pub fn history(&self) -> &[WinnerRecord] {
        &self.history
    }

    /// Pending forced winners.
    pub fn forced(&self) -> &ForcedWinnerQueue {
        &self.forced
    }

    /// Current operator toggles.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Replace operator toggles.
    pub fn set_settings(&mut self, settings: SessionSettings) {
        self.settings = settings;
    }

    /// City matched by the region modes.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Mode of the last accepted draw.
    pub fn last_mode(&self) -> DrawMode {
        self.last_mode
    }

    /// Winner of the last completed draw.
    pub fn current_winner(&self) -> Option<&Entrant> {
        self.current_winner.as_ref()
    }

    /// Draw machine snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// Whether a draw is in flight.
    pub fn is_drawing(&self) -> bool {
        self.machine.is_drawing()
    }

    /// Pool draws are taken from: the overlay when enabled and not empty, else the primary pool.
    pub fn active_source(&self) -> (PoolKind, &EntrantPool) {
        if self.settings.use_custom_names && !self.custom.pool().is_empty() {
            (PoolKind::Custom, self.custom.pool())
        } else {
            (PoolKind::Primary, &self.primary)
        }
    }

    /// Names shown on the reel: the primary pool, or the active source when the primary
    /// pool is empty (custom-only sessions).
    pub fn spin_list(&self) -> &EntrantPool {
        if self.primary.is_empty() {
            self.active_source().1
        } else {
            &self.primary
        }
    }

    /// Entrants that can win the next draw under `mode`.
    ///
    /// Region modes only filter the primary pool; overlay entrants carry no city.
    pub fn eligible(&self, mode: DrawMode) -> Vec<&Entrant> {
        let (kind, source) = self.active_source();
        let mode = match kind {
            PoolKind::Primary => mode,
            PoolKind::Custom => DrawMode::All,
        };
        draw::eligible(source.entries(), &self.history, mode, &self.region)
    }

    /// Accept a draw request: pick the winner, consume the forced head and compute the reel.
    ///
    /// History and pools are untouched until [`DrawSession::complete_draw`].
    pub fn begin_draw<R: RandomSource>(
        &mut self,
        mode: DrawMode,
        rng: &mut R,
    ) -> Result<DrawStart, DrawRejected> {
        if self.machine.is_drawing() {
            return Err(DrawRejected::AlreadyDrawing);
        }

        let (origin, source) = self.active_source();
        if source.is_empty() {
            return Err(DrawRejected::EmptyPool);
        }

        let eligible = self.eligible(mode);
        let mut forced = self.forced.clone();
        let selection = draw::select_winner(source.entries(), &eligible, &mut forced, rng)
            .ok_or(DrawRejected::EmptyPool)?;
        let reel = reel::position(self.spin_list().entries(), &selection.winner, rng)
            .ok_or(DrawRejected::EmptyPool)?;

        let ticket = DrawTicket {
            id: Uuid::new_v4(),
            mode,
            winner: selection.winner,
            origin,
            started_at: std::time::Instant::now(),
        };
        let id = ticket.id;
        self.machine
            .apply(DrawEvent::Start(ticket))
            .map_err(|_| DrawRejected::AlreadyDrawing)?;
        self.forced = forced;
        self.last_mode = mode;

        debug!(draw_id = %id, path = ?selection.path, "draw accepted");
        Ok(DrawStart {
            id,
            mode,
            reel,
            path: selection.path,
        })
    }

    /// Commit the pending draw `id`: append the winner to history and optionally remove it
    /// from its pool. Runs at most once per draw.
    pub fn complete_draw(&mut self, id: DrawId) -> Result<DrawCompletion, TransitionError> {
        let ticket = self.machine.pending().cloned().ok_or_else(|| InvalidTransition {
            from: DrawPhase::Idle,
            event: DrawEvent::Complete(id),
        })?;
        self.machine.apply(DrawEvent::Complete(id))?;

        let removed_from = if self.settings.remove_winner && self.remove_winner(&ticket) {
            Some(ticket.origin)
        } else {
            None
        };

        let record = WinnerRecord::now(ticket.winner.clone());
        self.history.push(record.clone());
        self.current_winner = Some(ticket.winner);

        Ok(DrawCompletion {
            id,
            mode: ticket.mode,
            elapsed: ticket.started_at.elapsed(),
            record,
            removed_from,
            play_sound: self.settings.enable_sound,
        })
    }

    /// Drop the pending draw `id` without committing anything.
    pub fn cancel_draw(&mut self, id: DrawId) -> Result<(), TransitionError> {
        self.machine.apply(DrawEvent::Cancel(id)).map(|_| ())
    }

    /// Identifier of the pending draw, if any.
    pub fn pending_draw(&self) -> Option<DrawId> {
        self.machine.pending().map(|ticket| ticket.id)
    }

    /// Merge fetched entrants into the primary pool. Returns how many were new.
    pub fn merge_feed(&mut self, fetched: Vec<Entrant>) -> usize {
        self.primary.merge_feed(fetched)
    }

    /// Recompute the overlay from raw operator text.
    pub fn set_custom_names(&mut self, raw: impl Into<String>) {
        self.custom = CustomOverlay::from_text(raw);
    }

    /// Replace the primary pool wholesale.
    pub fn replace_primary(&mut self, entries: Vec<Entrant>) {
        self.primary.replace(entries);
    }

    /// Replace the overlay wholesale, regenerating its raw text.
    pub fn replace_custom(&mut self, entries: Vec<Entrant>) {
        self.custom = CustomOverlay::from_entrants(entries);
    }

    /// Queue forced winners; blank names are ignored. Returns how many were queued.
    pub fn enqueue_forced<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queued = 0;
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                self.forced.push(name);
                queued += 1;
            }
        }
        queued
    }

    /// Clear the winner history. Refused while a draw is in flight.
    pub fn reset_history(&mut self) -> Result<usize, DrawRejected> {
        if self.machine.is_drawing() {
            return Err(DrawRejected::AlreadyDrawing);
        }
        let cleared = self.history.len();
        self.history.clear();
        self.current_winner = None;
        Ok(cleared)
    }

    fn remove_winner(&mut self, ticket: &DrawTicket) -> bool {
        match ticket.origin {
            PoolKind::Primary => self.primary.remove(&ticket.winner.name),
            PoolKind::Custom => self.custom.remove(&ticket.winner.name),
        }
    }
}
