pub mod file;
pub mod memory;

use std::fmt;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

/// Keys of the durable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Winner history.
    Winners,
    /// Primary pool cache.
    AllNames,
    /// Custom-names overlay.
    CustomNames,
}

impl StoreKey {
    /// Stable name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Winners => "winners",
            StoreKey::AllNames => "allNames",
            StoreKey::CustomNames => "customNames",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key-value persistence for the serialized session state.
pub trait SessionStore: Send + Sync {
    /// Raw value stored under `key`, or `None` when absent.
    fn load(&self, key: StoreKey) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Replace the value stored under `key`.
    fn save(&self, key: StoreKey, value: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backing medium is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
