use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    session_store::{SessionStore, StoreKey},
    storage::StorageResult,
};

/// Volatile [`SessionStore`] used when no state directory is usable, and by tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    values: Arc<DashMap<StoreKey, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization.
    pub fn insert_raw(&self, key: StoreKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Current raw value under `key`.
    pub fn raw(&self, key: StoreKey) -> Option<String> {
        self.values.get(&key).map(|entry| entry.value().clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: StoreKey) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let value = self.raw(key);
        Box::pin(async move { Ok(value) })
    }

    fn save(&self, key: StoreKey, value: String) -> BoxFuture<'static, StorageResult<()>> {
        self.values.insert(key, value);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
