use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::state::{draw::DrawMode, entrant::Entrant};

/// Unique identifier of an in-flight draw.
pub type DrawId = Uuid;

/// Which pool a draw was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// The remote feed / CSV pool.
    Primary,
    /// The custom-names overlay.
    Custom,
}

/// Draw that has been decided but whose completion has not fired yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawTicket {
    /// Identifier matched by the completion callback.
    pub id: DrawId,
    /// Region filter requested for the draw.
    pub mode: DrawMode,
    /// Entrant revealed on completion.
    pub winner: Entrant,
    /// Pool the winner is removed from when removal is enabled.
    pub origin: PoolKind,
    /// When the draw entered the drawing phase.
    pub started_at: Instant,
}

/// Phases of the draw session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DrawPhase {
    /// Ready for a draw request.
    #[default]
    Idle,
    /// The reel is spinning; new requests are rejected.
    Drawing(DrawTicket),
}

/// Events accepted by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawEvent {
    /// A draw request was accepted.
    Start(DrawTicket),
    /// The deferred completion fired for the given draw.
    Complete(DrawId),
    /// The pending draw was torn down before completing.
    Cancel(DrawId),
}

/// Error returned when an event cannot be applied from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase when the event was received.
    pub from: DrawPhase,
    /// Rejected event.
    pub event: DrawEvent,
}

/// Errors raised by [`DrawStateMachine::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The event is not valid from the current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// The event targets a draw other than the pending one.
    #[error("draw id mismatch (expected {expected}, got {got})")]
    IdMismatch {
        /// Pending draw.
        expected: DrawId,
        /// Draw named by the event.
        got: DrawId,
    },
}

/// Snapshot of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Identifier of the pending draw, if any.
    pub drawing: Option<DrawId>,
    /// Number of transitions applied so far.
    pub version: usize,
}

/// Idle/Drawing machine; at most one draw is in flight.
#[derive(Debug, Clone, Default)]
pub struct DrawStateMachine {
    phase: DrawPhase,
    version: usize,
}

impl DrawStateMachine {
    /// Create a machine in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    /// Whether a draw is in flight.
    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, DrawPhase::Drawing(_))
    }

    /// The pending draw, if any.
    pub fn pending(&self) -> Option<&DrawTicket> {
        match &self.phase {
            DrawPhase::Drawing(ticket) => Some(ticket),
            DrawPhase::Idle => None,
        }
    }

    /// Create a snapshot of the machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            drawing: self.pending().map(|ticket| ticket.id),
            version: self.version,
        }
    }

    /// Apply an event. Completing or cancelling returns the ticket that was pending.
    pub fn apply(&mut self, event: DrawEvent) -> Result<Option<DrawTicket>, TransitionError> {
        let previous = std::mem::take(&mut self.phase);
        let (next, released) = match (previous, event) {
            (DrawPhase::Idle, DrawEvent::Start(ticket)) => (DrawPhase::Drawing(ticket), None),
            (DrawPhase::Drawing(ticket), DrawEvent::Complete(id) | DrawEvent::Cancel(id)) => {
                if ticket.id != id {
                    let expected = ticket.id;
                    self.phase = DrawPhase::Drawing(ticket);
                    return Err(TransitionError::IdMismatch { expected, got: id });
                }
                (DrawPhase::Idle, Some(ticket))
            }
            (from, event) => {
                self.phase = from.clone();
                return Err(InvalidTransition { from, event }.into());
            }
        };

        self.phase = next;
        self.version += 1;
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(name: &str) -> DrawTicket {
        DrawTicket {
            id: Uuid::new_v4(),
            mode: DrawMode::All,
            winner: Entrant::new(name, "Pune"),
            origin: PoolKind::Primary,
            started_at: Instant::now(),
        }
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = DrawStateMachine::new();
        assert_eq!(sm.phase(), &DrawPhase::Idle);
        assert_eq!(sm.snapshot().version, 0);
    }

    #[test]
    fn start_then_complete_returns_ticket() {
        let mut sm = DrawStateMachine::new();
        let t = ticket("Alice");
        assert_eq!(sm.apply(DrawEvent::Start(t.clone())).unwrap(), None);
        assert!(sm.is_drawing());
        assert_eq!(sm.snapshot().drawing, Some(t.id));

        let released = sm.apply(DrawEvent::Complete(t.id)).unwrap();
        assert_eq!(released, Some(t));
        assert_eq!(sm.phase(), &DrawPhase::Idle);
        assert_eq!(sm.snapshot().version, 2);
    }

    #[test]
    fn second_start_while_drawing_is_invalid() {
        let mut sm = DrawStateMachine::new();
        let first = ticket("Alice");
        sm.apply(DrawEvent::Start(first.clone())).unwrap();

        let err = sm.apply(DrawEvent::Start(ticket("Bob"))).unwrap_err();
        match err {
            TransitionError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, DrawPhase::Drawing(first.clone()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sm.pending(), Some(&first));
        assert_eq!(sm.snapshot().version, 1);
    }

    #[test]
    fn stale_completion_is_rejected() {
        let mut sm = DrawStateMachine::new();
        let t = ticket("Alice");
        sm.apply(DrawEvent::Start(t.clone())).unwrap();

        let stale = Uuid::new_v4();
        let err = sm.apply(DrawEvent::Complete(stale)).unwrap_err();
        assert_eq!(
            err,
            TransitionError::IdMismatch {
                expected: t.id,
                got: stale
            }
        );
        assert!(sm.is_drawing());
    }

    #[test]
    fn completion_runs_once() {
        let mut sm = DrawStateMachine::new();
        let t = ticket("Alice");
        sm.apply(DrawEvent::Start(t.clone())).unwrap();
        sm.apply(DrawEvent::Cancel(t.id)).unwrap();

        assert!(matches!(
            sm.apply(DrawEvent::Complete(t.id)),
            Err(TransitionError::InvalidTransition(_))
        ));
    }
}
