//! Typed access to the durable session state.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::{
    dao::{
        models::{EntrantEntity, WinnerEntity},
        session_store::{SessionStore, StoreKey},
        storage::{StorageError, StorageResult},
    },
    state::entrant::{Entrant, WinnerRecord},
};

/// Encodes session state as JSON arrays on top of a [`SessionStore`].
///
/// Loads never fail: missing, unreadable or corrupt entries come back empty, and a list
/// only loses the elements that do not decode.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn SessionStore>,
    writes: Arc<Mutex<()>>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Serialize writers. Hold the guard from taking the snapshot until the save returns
    /// so a stale snapshot never lands after a newer one.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Cached primary pool.
    pub async fn load_primary(&self) -> Vec<Entrant> {
        self.load_list::<EntrantEntity>(StoreKey::AllNames)
            .await
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Winner history, oldest first.
    pub async fn load_history(&self) -> Vec<WinnerRecord> {
        self.load_list::<WinnerEntity>(StoreKey::Winners)
            .await
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Custom-names overlay.
    pub async fn load_custom(&self) -> Vec<Entrant> {
        self.load_list::<EntrantEntity>(StoreKey::CustomNames)
            .await
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub async fn save_primary(&self, entries: &[Entrant]) -> StorageResult<()> {
        let entities: Vec<EntrantEntity> = entries.iter().cloned().map(Into::into).collect();
        self.save_list(StoreKey::AllNames, &entities).await
    }

    pub async fn save_history(&self, history: &[WinnerRecord]) -> StorageResult<()> {
        let entities: Vec<WinnerEntity> = history.iter().cloned().map(Into::into).collect();
        self.save_list(StoreKey::Winners, &entities).await
    }

    pub async fn save_custom(&self, entries: &[Entrant]) -> StorageResult<()> {
        let entities: Vec<EntrantEntity> = entries.iter().cloned().map(Into::into).collect();
        self.save_list(StoreKey::CustomNames, &entities).await
    }

    async fn load_list<T: DeserializeOwned>(&self, key: StoreKey) -> Vec<T> {
        let raw = match self.store.load(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(%key, error = %err, "failed to read stored entry; treating as empty");
                return Vec::new();
            }
        };

        let items = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(%key, error = %err, "stored entry is corrupt; treating as empty");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!(%key, index, error = %err, "dropping undecodable stored element");
                    None
                }
            })
            .collect()
    }

    async fn save_list<T: Serialize>(&self, key: StoreKey, list: &[T]) -> StorageResult<()> {
        let raw = serde_json::to_string(list).map_err(|source| {
            StorageError::unavailable(format!("cannot encode `{key}`"), source)
        })?;
        self.store.save(key, raw).await
    }
}
