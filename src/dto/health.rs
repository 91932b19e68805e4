use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the session store answered its health check.
    pub storage: bool,
}

impl HealthResponse {
    /// Build the response from the store reachability.
    pub fn from_storage(reachable: bool) -> Self {
        Self {
            status: if reachable { "ok" } else { "degraded" }.to_string(),
            storage: reachable,
        }
    }
}
