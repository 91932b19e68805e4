use tracing::{info, warn};

use crate::{
    dto::pool::{
        CustomNamesResponse, EntrantDto, ForcedWinnersResponse, ImportResponse, PoolKindDto,
        PoolResponse, ResetHistoryResponse, SettingsDto, UpdateSettingsRequest, WinnerDto,
    },
    error::ServiceError,
    services::{collaborators::EntrantFeed, csv_codec, sse_events},
    state::{SharedState, state_machine::PoolKind},
};

/// Reinstall the durable pools and history. Missing or corrupt entries come back empty.
pub async fn restore_session(state: &SharedState) {
    let repository = state.repository();
    let primary = repository.load_primary().await;
    let history = repository.load_history().await;
    let custom = repository.load_custom().await;

    info!(
        primary = primary.len(),
        winners = history.len(),
        custom = custom.len(),
        "restored draw session"
    );
    state.session().write().await.restore(primary, history, custom);
}

/// Merge the remote feed into the cached primary pool and persist the result.
///
/// Feed failures are logged and leave the cached pool untouched. Returns how many
/// entrants were new.
pub async fn load_initial_pool(state: &SharedState, feed: &dyn EntrantFeed) -> usize {
    let fetched = match feed.fetch().await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(error = %err, "failed to fetch entrants; keeping cached pool");
            return 0;
        }
    };

    let fetched_count = fetched.len();
    let added = state.session().write().await.merge_feed(fetched);
    let count = persist_pool(state, PoolKind::Primary).await;
    info!(fetched = fetched_count, added, total = count, "merged entrant feed");
    sse_events::broadcast_pool_updated(state, PoolKind::Primary, count);
    added
}

/// Both pools and the source of the next draw.
pub async fn list_pool(state: &SharedState) -> PoolResponse {
    let session = state.session().read().await;
    PoolResponse {
        active: session.active_source().0.into(),
        primary: session.primary().entries().iter().map(EntrantDto::from).collect(),
        custom: session
            .custom()
            .pool()
            .entries()
            .iter()
            .map(EntrantDto::from)
            .collect(),
        custom_text: session.custom().raw().to_string(),
    }
}

/// Winner history, oldest first.
pub async fn list_winners(state: &SharedState) -> Vec<WinnerDto> {
    let session = state.session().read().await;
    session.history().iter().map(WinnerDto::from).collect()
}

/// Recompute the custom-names overlay from raw text.
pub async fn set_custom_names(state: &SharedState, text: String) -> CustomNamesResponse {
    let names: Vec<String> = {
        let mut session = state.session().write().await;
        session.set_custom_names(text);
        session
            .custom()
            .pool()
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    };

    let count = persist_pool(state, PoolKind::Custom).await;
    sse_events::broadcast_pool_updated(state, PoolKind::Custom, count);
    CustomNamesResponse { count, names }
}

/// Replace a pool wholesale with the rows of a CSV document.
pub async fn import_csv(
    state: &SharedState,
    target: PoolKindDto,
    text: &str,
) -> Result<ImportResponse, ServiceError> {
    let entries = csv_codec::parse_entrants(text);
    let kind = PoolKind::from(target);
    let imported = entries.len();
    {
        let mut session = state.session().write().await;
        match kind {
            PoolKind::Primary => session.replace_primary(entries),
            PoolKind::Custom => session.replace_custom(entries),
        }
    }

    let count = persist_pool(state, kind).await;
    info!(?target, imported, "imported csv");
    sse_events::broadcast_pool_updated(state, kind, count);
    Ok(ImportResponse { target, imported })
}

/// Primary pool as CSV.
pub async fn export_pool_csv(state: &SharedState) -> Result<String, ServiceError> {
    let session = state.session().read().await;
    Ok(csv_codec::export_pool(session.primary().entries())?)
}

/// Winner history as CSV.
pub async fn export_winners_csv(state: &SharedState) -> Result<String, ServiceError> {
    let session = state.session().read().await;
    Ok(csv_codec::export_winners(session.history())?)
}

/// Append names to the forced-winner queue.
pub async fn enqueue_forced(state: &SharedState, names: &[String]) -> ForcedWinnersResponse {
    let mut session = state.session().write().await;
    let queued = session.enqueue_forced(names);
    info!(queued, pending = session.forced().len(), "queued forced winners");
    ForcedWinnersResponse {
        queued,
        queue: session.forced().names(),
    }
}

/// Pending forced winners.
pub async fn forced_winners(state: &SharedState) -> ForcedWinnersResponse {
    let session = state.session().read().await;
    ForcedWinnersResponse {
        queued: 0,
        queue: session.forced().names(),
    }
}

/// Apply a partial settings update.
pub async fn update_settings(state: &SharedState, request: UpdateSettingsRequest) -> SettingsDto {
    let mut session = state.session().write().await;
    let settings = request.apply(session.settings());
    session.set_settings(settings);
    info!(?settings, "updated session settings");
    settings.into()
}

/// Clear the winner history. Refused while a draw is in flight.
pub async fn reset_history(state: &SharedState) -> Result<ResetHistoryResponse, ServiceError> {
    let cleared = state.session().write().await.reset_history()?;
    persist_history(state).await;
    info!(cleared, "winner history reset");
    sse_events::broadcast_winners_reset(state, cleared);
    Ok(ResetHistoryResponse { cleared })
}

/// Save the current content of a pool. Failures are logged; memory stays authoritative.
/// Returns the pool size.
pub(crate) async fn persist_pool(state: &SharedState, kind: PoolKind) -> usize {
    let repository = state.repository();
    let _writes = repository.lock_writes().await;
    let entries = {
        let session = state.session().read().await;
        match kind {
            PoolKind::Primary => session.primary().entries().to_vec(),
            PoolKind::Custom => session.custom().pool().entries().to_vec(),
        }
    };

    let result = match kind {
        PoolKind::Primary => repository.save_primary(&entries).await,
        PoolKind::Custom => repository.save_custom(&entries).await,
    };
    if let Err(err) = result {
        warn!(?kind, error = %err, "failed to persist pool");
    }
    entries.len()
}

/// Save the winner history. Failures are logged; memory stays authoritative.
pub(crate) async fn persist_history(state: &SharedState) {
    let repository = state.repository();
    let _writes = repository.lock_writes().await;
    let history = state.session().read().await.history().to_vec();
    if let Err(err) = repository.save_history(&history).await {
        warn!(winners = history.len(), error = %err, "failed to persist winner history");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            repository::SessionRepository,
            session_store::{StoreKey, memory::MemorySessionStore},
        },
        services::collaborators::{NoopReporter, testing::StaticFeed},
        state::{
            AppState, StateOptions,
            draw::DrawMode,
            entrant::{Entrant, SourceTag},
            random::ScriptedRandom,
        },
    };

    fn state_with(store: Arc<MemorySessionStore>) -> SharedState {
        AppState::with_options(
            AppConfig::default(),
            SessionRepository::new(store),
            Arc::new(NoopReporter),
            StateOptions {
                rng: Box::new(ScriptedRandom::new([0, 0, 0, 0])),
                ..StateOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn restore_reads_every_key_and_tolerates_corruption() {
        let store = Arc::new(MemorySessionStore::new());
        store.insert_raw(
            StoreKey::AllNames,
            r#"[{"name":"Asha","city":"Pune","flag":"","empId":101}]"#,
        );
        store.insert_raw(StoreKey::Winners, "not json");
        store.insert_raw(
            StoreKey::CustomNames,
            r#"[{"name":"Guest","city":"","flag":"custom"}]"#,
        );
        let state = state_with(store);

        restore_session(&state).await;

        let session = state.session().read().await;
        assert_eq!(session.primary().len(), 1);
        assert!(session.history().is_empty());
        assert_eq!(session.custom().raw(), "Guest");
    }

    #[tokio::test]
    async fn feed_merge_appends_new_names_and_persists() {
        let store = Arc::new(MemorySessionStore::new());
        let state = state_with(store.clone());
        state
            .session()
            .write()
            .await
            .replace_primary(vec![Entrant::new("Asha", "Pune")]);

        let feed = StaticFeed::new(vec![
            Entrant::new("ASHA", "Pune"),
            Entrant::new("Ravi", "Delhi").with_external_id("102"),
        ]);
        let added = load_initial_pool(&state, &feed).await;

        assert_eq!(added, 1);
        let names: Vec<String> = state
            .session()
            .read()
            .await
            .primary()
            .entries()
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["Asha", "Ravi"]);
        assert!(store.raw(StoreKey::AllNames).unwrap().contains("Ravi"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_writers_leave_the_latest_pool_stored() {
        let store = Arc::new(MemorySessionStore::new());
        let state = state_with(store.clone());

        let writers: Vec<_> = (0..32)
            .map(|n| {
                let state = state.clone();
                tokio::spawn(async move {
                    let entries = (0..=n)
                        .map(|i| Entrant::new(format!("E{i}"), "Pune"))
                        .collect();
                    state.session().write().await.replace_primary(entries);
                    persist_pool(&state, PoolKind::Primary).await;
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let in_memory = state.session().read().await.primary().entries().to_vec();
        assert_eq!(state.repository().load_primary().await, in_memory);
    }

    #[tokio::test]
    async fn feed_failure_keeps_the_cached_pool() {
        let store = Arc::new(MemorySessionStore::new());
        let state = state_with(store.clone());
        state
            .session()
            .write()
            .await
            .replace_primary(vec![Entrant::new("Asha", "Pune")]);

        assert_eq!(load_initial_pool(&state, &StaticFeed::failing()).await, 0);
        assert_eq!(state.session().read().await.primary().len(), 1);
        assert!(store.raw(StoreKey::AllNames).is_none());
    }

    #[tokio::test]
    async fn custom_names_are_parsed_and_persisted() {
        let store = Arc::new(MemorySessionStore::new());
        let state = state_with(store.clone());

        let response = set_custom_names(&state, "  Guest One \n\n Guest Two\n".into()).await;

        assert_eq!(response.count, 2);
        assert_eq!(response.names, vec!["Guest One", "Guest Two"]);
        let stored = store.raw(StoreKey::CustomNames).unwrap();
        assert!(stored.contains("\"flag\":\"custom\""));
    }

    #[tokio::test]
    async fn csv_import_into_overlay_replaces_it() {
        let store = Arc::new(MemorySessionStore::new());
        let state = state_with(store.clone());
        set_custom_names(&state, "Old".into()).await;

        let response = import_csv(
            &state,
            PoolKindDto::Custom,
            "name,city,flag\nNew One,,custom\nNew Two,,custom\n",
        )
        .await
        .unwrap();

        assert_eq!(response.imported, 2);
        let session = state.session().read().await;
        assert_eq!(session.custom().raw(), "New One\nNew Two");
        assert!(
            session
                .custom()
                .pool()
                .entries()
                .iter()
                .all(|e| e.source == SourceTag::Custom)
        );
    }

    #[tokio::test]
    async fn csv_export_round_trips_the_primary_pool() {
        let state = state_with(Arc::new(MemorySessionStore::new()));
        import_csv(
            &state,
            PoolKindDto::Primary,
            "name,city,flag,externalId\nAsha,Pune,,101\nRavi,Delhi,,\n",
        )
        .await
        .unwrap();

        let exported = export_pool_csv(&state).await.unwrap();
        assert_eq!(
            exported.lines().collect::<Vec<_>>(),
            vec!["name,city,flag,externalId", "Asha,Pune,,101", "Ravi,Delhi,,"]
        );
    }

    #[tokio::test]
    async fn forced_winners_and_settings_are_operator_controlled() {
        let state = state_with(Arc::new(MemorySessionStore::new()));

        let response = enqueue_forced(&state, &["Asha".into(), "  ".into(), "Ravi".into()]).await;
        assert_eq!(response.queued, 2);
        assert_eq!(forced_winners(&state).await.queue, vec!["Asha", "Ravi"]);

        let settings = update_settings(
            &state,
            UpdateSettingsRequest {
                enable_sound: Some(true),
                ..UpdateSettingsRequest::default()
            },
        )
        .await;
        assert!(settings.enable_sound);
        assert!(!settings.remove_winner);
    }

    #[tokio::test]
    async fn reset_is_refused_while_drawing() {
        let store = Arc::new(MemorySessionStore::new());
        let state = state_with(store.clone());
        state
            .session()
            .write()
            .await
            .replace_primary(vec![Entrant::new("Asha", "Pune")]);

        let start = state.begin_draw(DrawMode::All).await.unwrap();
        assert!(matches!(
            reset_history(&state).await,
            Err(ServiceError::DrawInProgress)
        ));

        state.session().write().await.complete_draw(start.id).unwrap();
        assert_eq!(reset_history(&state).await.unwrap().cleared, 1);
        assert_eq!(store.raw(StoreKey::Winners).as_deref(), Some("[]"));
    }
}
