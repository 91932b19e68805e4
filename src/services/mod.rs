/// Remote entrant feed and winner-report sink abstractions.
pub mod collaborators;
/// CSV import/export of pools and winners.
pub mod csv_codec;
/// OpenAPI documentation generation.
pub mod documentation;
/// Draw requests, deferred completion and cancellation.
pub mod draw_service;
/// Health check service.
pub mod health_service;
/// Pool loading, custom names, CSV, forced winners and settings.
pub mod pool_service;
/// HTTP collaborators backed by reqwest.
#[cfg(feature = "remote")]
pub mod remote;
/// Keyboard shortcut mapping.
pub mod shortcuts;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
