use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    dto::{
        draw::{DrawStartedResponse, ShortcutOutcome, ShortcutResponse},
        session::SessionSummary,
    },
    error::ServiceError,
    services::{
        collaborators::WinnerReport,
        pool_service::{persist_history, persist_pool},
        shortcuts::Shortcut,
        sse_events,
    },
    state::{
        SharedState, draw::DrawMode, schedule::ScheduledCompletion, session::DrawCompletion,
        state_machine::DrawId,
    },
};

/// Read-only view of the session.
pub async fn session_summary(state: &SharedState) -> SessionSummary {
    let session = state.session().read().await;
    SessionSummary::from(&*session)
}

/// Start a draw and schedule its completion after the reel animation.
///
/// Without a mode the last used one applies. Rejected while another draw is in flight.
pub async fn request_draw(
    state: &SharedState,
    mode: Option<DrawMode>,
) -> Result<DrawStartedResponse, ServiceError> {
    if state.is_disposed() {
        return Err(ServiceError::InvalidState("session is shutting down".into()));
    }

    let mode = match mode {
        Some(mode) => mode,
        None => state.session().read().await.last_mode(),
    };

    let start = state.begin_draw(mode).await.inspect_err(|err| {
        debug!(?mode, reason = %err, "draw request rejected");
    })?;
    let id = start.id;
    let delay = state.draw_duration();
    let duration_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    let response = DrawStartedResponse::new(start, duration_ms);

    // The task only holds a weak handle: a dropped state never gets mutated.
    let weak = Arc::downgrade(state);
    let completion = ScheduledCompletion::spawn(id, delay, move || async move {
        if let Some(state) = weak.upgrade() {
            complete_draw(&state, id).await;
        }
    });
    state.install_completion(completion).await;

    info!(draw_id = %id, ?mode, duration_ms, "draw started");
    sse_events::broadcast_draw_started(state, &response);
    Ok(response)
}

/// Run the draw bound to `key`. Unbound keys and refused draws are reported, not failed.
pub async fn request_shortcut(
    state: &SharedState,
    key: &str,
) -> Result<ShortcutResponse, ServiceError> {
    let Some(shortcut) = Shortcut::from_key(key) else {
        debug!(key, "ignoring unbound key");
        return Ok(ShortcutResponse {
            outcome: ShortcutOutcome::Ignored,
            reason: None,
            draw: None,
        });
    };

    let last = state.session().read().await.last_mode();
    match request_draw(state, Some(shortcut.mode(last))).await {
        Ok(draw) => Ok(ShortcutResponse {
            outcome: ShortcutOutcome::Started,
            reason: None,
            draw: Some(draw),
        }),
        Err(err @ (ServiceError::DrawInProgress | ServiceError::EmptyPool)) => {
            Ok(ShortcutResponse {
                outcome: ShortcutOutcome::Rejected,
                reason: Some(err.to_string()),
                draw: None,
            })
        }
        Err(err) => Err(err),
    }
}

/// Drop the pending draw, if any, without committing it.
pub async fn cancel_pending_draw(state: &SharedState) -> Option<DrawId> {
    let cancelled = state.cancel_pending().await?;
    info!(draw_id = %cancelled, "draw cancelled");
    sse_events::broadcast_draw_cancelled(state, cancelled);
    Some(cancelled)
}

/// Commit draw `id`: history, pool removal, persistence, announcement and report.
///
/// Stale or repeated completions and completions after disposal are ignored.
pub async fn complete_draw(state: &SharedState, id: DrawId) -> Option<DrawCompletion> {
    let completion = {
        let mut session = state.session().write().await;
        if state.is_disposed() {
            debug!(draw_id = %id, "session disposed; dropping completion");
            return None;
        }
        match session.complete_draw(id) {
            Ok(completion) => completion,
            Err(err) => {
                debug!(draw_id = %id, error = %err, "ignoring stale completion");
                return None;
            }
        }
    };
    state.release_completion(id).await;

    let winner = &completion.record.entrant;
    info!(
        draw_id = %id,
        mode = ?completion.mode,
        elapsed_ms = completion.elapsed.as_millis() as u64,
        winner = %winner.name,
        removed = completion.removed_from.is_some(),
        "draw completed"
    );

    persist_history(state).await;
    if let Some(kind) = completion.removed_from {
        let count = persist_pool(state, kind).await;
        sse_events::broadcast_pool_updated(state, kind, count);
    }
    sse_events::broadcast_draw_completed(state, &completion);
    report_winner(state, &completion);

    Some(completion)
}

/// Fire-and-forget notification of the remote sink.
fn report_winner(state: &SharedState, completion: &DrawCompletion) {
    let entrant = &completion.record.entrant;
    let Some(winner_id) = entrant.external_id.clone() else {
        debug!(winner = %entrant.name, "winner has no external id; not reporting");
        return;
    };

    let report = WinnerReport {
        session_id: state.config().event_id.clone(),
        winner_id,
    };
    let reporter = state.reporter();
    let draw_id = completion.id;
    tokio::spawn(async move {
        if let Err(err) = reporter.report(report).await {
            warn!(draw_id = %draw_id, error = %err, "failed to report winner");
        }
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            repository::SessionRepository,
            session_store::{StoreKey, memory::MemorySessionStore},
        },
        services::collaborators::testing::RecordingReporter,
        state::{
            AppState, DRAW_DURATION, StateOptions,
            entrant::Entrant,
            random::SeededRandom,
        },
    };

    struct Fixture {
        state: SharedState,
        store: Arc<MemorySessionStore>,
        reporter: RecordingReporter,
    }

    async fn fixture(entries: Vec<Entrant>, reporter: RecordingReporter) -> Fixture {
        let store = Arc::new(MemorySessionStore::new());
        let repository = SessionRepository::new(store.clone());
        let state = AppState::with_options(
            AppConfig::default(),
            repository,
            Arc::new(reporter.clone()),
            StateOptions {
                rng: Box::new(SeededRandom::new(11)),
                draw_duration: DRAW_DURATION,
            },
        );
        state
            .session()
            .write()
            .await
            .restore(entries, Vec::new(), Vec::new());
        Fixture {
            state,
            store,
            reporter,
        }
    }

    fn staff() -> Vec<Entrant> {
        vec![
            Entrant::new("Asha", "Pune").with_external_id("101"),
            Entrant::new("Ravi", "Delhi").with_external_id("102"),
            Entrant::new("Meera", "PUNE").with_external_id("103"),
        ]
    }

    async fn settle() {
        tokio::time::sleep(DRAW_DURATION + Duration::from_millis(1)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn second_draw_is_rejected_until_completion() {
        let fx = fixture(staff(), RecordingReporter::default()).await;

        let first = request_draw(&fx.state, Some(DrawMode::All)).await.unwrap();
        assert_eq!(first.reel.spin_list.len(), 3);
        assert_eq!(first.duration_ms, 6_000);

        let second = request_draw(&fx.state, Some(DrawMode::All)).await;
        assert!(matches!(second, Err(ServiceError::DrawInProgress)));
        assert!(fx.state.session().read().await.history().is_empty());

        tokio::time::sleep(Duration::from_millis(5_900)).await;
        assert!(fx.state.session().read().await.history().is_empty());

        settle().await;
        let session = fx.state.session().read().await;
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_drawing());
        assert_eq!(
            session.current_winner().map(|w| w.name.clone()),
            Some(session.history()[0].name().to_string())
        );
        assert!(fx.store.raw(StoreKey::Winners).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_reports_the_winner_and_survives_report_failure() {
        let reporter = RecordingReporter {
            fail: true,
            ..RecordingReporter::default()
        };
        let fx = fixture(staff(), reporter).await;

        request_draw(&fx.state, None).await.unwrap();
        settle().await;

        let history = fx.state.session().read().await.history().to_vec();
        assert_eq!(history.len(), 1);

        let reports = fx.reporter.recorded();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].session_id, "4");
        assert_eq!(
            Some(reports[0].winner_id.as_str()),
            history[0].entrant.external_id.as_deref()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn winners_without_external_id_are_not_reported() {
        let fx = fixture(vec![Entrant::new("Guest", "Pune")], RecordingReporter::default()).await;

        request_draw(&fx.state, None).await.unwrap();
        settle().await;

        assert_eq!(fx.state.session().read().await.history().len(), 1);
        assert!(fx.reporter.recorded().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn removal_setting_shrinks_and_persists_the_pool() {
        let fx = fixture(staff(), RecordingReporter::default()).await;
        {
            let mut session = fx.state.session().write().await;
            let mut settings = session.settings();
            settings.remove_winner = true;
            session.set_settings(settings);
        }

        request_draw(&fx.state, Some(DrawMode::RegionB)).await.unwrap();
        settle().await;

        let session = fx.state.session().read().await;
        assert_eq!(session.history()[0].name(), "Ravi");
        assert_eq!(session.primary().len(), 2);
        assert!(session.primary().find("Ravi").is_none());
        let cached = fx.store.raw(StoreKey::AllNames).unwrap();
        assert!(!cached.contains("Ravi"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_pool_is_rejected_without_state_change() {
        let fx = fixture(Vec::new(), RecordingReporter::default()).await;

        let result = request_draw(&fx.state, Some(DrawMode::All)).await;
        assert!(matches!(result, Err(ServiceError::EmptyPool)));
        assert!(!fx.state.session().read().await.is_drawing());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_draw_never_commits() {
        let fx = fixture(staff(), RecordingReporter::default()).await;

        let started = request_draw(&fx.state, None).await.unwrap();
        assert_eq!(cancel_pending_draw(&fx.state).await, Some(started.draw_id));
        assert_eq!(cancel_pending_draw(&fx.state).await, None);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(fx.state.session().read().await.history().is_empty());
        assert!(fx.store.raw(StoreKey::Winners).is_none());

        assert!(request_draw(&fx.state, None).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn disposed_session_is_never_mutated() {
        let fx = fixture(staff(), RecordingReporter::default()).await;

        request_draw(&fx.state, None).await.unwrap();
        fx.state.dispose().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(fx.state.session().read().await.history().is_empty());
        assert!(matches!(
            request_draw(&fx.state, None).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_state_skips_the_completion() {
        let fx = fixture(staff(), RecordingReporter::default()).await;
        let store = fx.store.clone();

        request_draw(&fx.state, None).await.unwrap();
        drop(fx);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(store.raw(StoreKey::Winners).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_is_ignored() {
        let fx = fixture(staff(), RecordingReporter::default()).await;

        assert!(complete_draw(&fx.state, uuid::Uuid::new_v4()).await.is_none());
        let started = request_draw(&fx.state, None).await.unwrap();
        assert!(complete_draw(&fx.state, started.draw_id).await.is_some());
        assert!(complete_draw(&fx.state, started.draw_id).await.is_none());

        settle().await;
        assert_eq!(fx.state.session().read().await.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shortcuts_map_keys_to_modes() {
        let fx = fixture(staff(), RecordingReporter::default()).await;

        let ignored = request_shortcut(&fx.state, "q").await.unwrap();
        assert_eq!(ignored.outcome, ShortcutOutcome::Ignored);

        let started = request_shortcut(&fx.state, "1").await.unwrap();
        assert_eq!(started.outcome, ShortcutOutcome::Started);

        let busy = request_shortcut(&fx.state, "3").await.unwrap();
        assert_eq!(busy.outcome, ShortcutOutcome::Rejected);

        settle().await;
        let winner = fx.state.session().read().await.history()[0].entrant.clone();
        assert!(winner.city.eq_ignore_ascii_case("pune"));

        let repeat = request_shortcut(&fx.state, "Space").await.unwrap();
        assert_eq!(repeat.outcome, ShortcutOutcome::Started);
        assert_eq!(fx.state.session().read().await.last_mode(), DrawMode::RegionA);
    }
}
