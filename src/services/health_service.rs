use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the session store; draws keep working in memory when it is unreachable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.repository().store().health_check().await {
        Ok(()) => HealthResponse::from_storage(true),
        Err(err) => {
            warn!(error = %err, "session store health check failed");
            HealthResponse::from_storage(false)
        }
    }
}
