/// Persisted JSON entity definitions.
pub mod models;
/// Typed load/save of the session state.
pub mod repository;
/// Key-value store abstraction and its backends.
pub mod session_store;
/// Storage error types.
pub mod storage;
