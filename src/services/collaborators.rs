//! Remote collaborators of the draw session: the entrant feed and the winner-report sink.

use futures::future::{self, BoxFuture};
use serde::Serialize;
use thiserror::Error;

use crate::state::entrant::Entrant;

/// Failures raised by remote collaborators. Never surfaced to draw callers.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The request could not be sent or its response could not be read.
    #[error("request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The remote answered with an unexpected status.
    #[error("unexpected status {status} from `{url}`")]
    Status { url: String, status: u16 },
    /// The payload did not have the expected shape.
    #[error("unexpected payload from `{url}`: {message}")]
    Payload { url: String, message: String },
}

/// Winner notification sent to the report sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerReport {
    /// Event identifier.
    pub session_id: String,
    /// External identifier of the winner.
    pub winner_id: String,
}

/// Source of entrants fetched once at session start.
pub trait EntrantFeed: Send + Sync {
    /// Fetch the full entrant list.
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Entrant>, CollaboratorError>>;
}

/// Sink receiving completed draws, best effort.
pub trait WinnerReporter: Send + Sync {
    /// Report a winner; the caller never awaits the outcome on the draw path.
    fn report(&self, report: WinnerReport) -> BoxFuture<'static, Result<(), CollaboratorError>>;
}

/// Feed returning no entrants; used when no feed is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeed;

impl EntrantFeed for NoopFeed {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Entrant>, CollaboratorError>> {
        Box::pin(future::ready(Ok(Vec::new())))
    }
}

/// Reporter dropping every report; used when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl WinnerReporter for NoopReporter {
    fn report(&self, _report: WinnerReport) -> BoxFuture<'static, Result<(), CollaboratorError>> {
        Box::pin(future::ready(Ok(())))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let report = WinnerReport {
            session_id: "4".into(),
            winner_id: "E17".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"sessionId": "4", "winnerId": "E17"}));
    }

    #[tokio::test]
    async fn noop_collaborators_succeed() {
        assert!(NoopFeed.fetch().await.unwrap().is_empty());
        assert!(
            NoopReporter
                .report(WinnerReport {
                    session_id: "4".into(),
                    winner_id: "1".into(),
                })
                .await
                .is_ok()
        );
    }
}
