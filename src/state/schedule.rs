//! Deferred, cancelable completion of an in-flight draw.

use std::{future::Future, time::Duration};

use tokio::{task::JoinHandle, time::sleep};

use crate::state::state_machine::DrawId;

/// Handle on a completion scheduled to run once, after a fixed delay.
#[derive(Debug)]
pub struct ScheduledCompletion {
    id: DrawId,
    handle: JoinHandle<()>,
}

impl ScheduledCompletion {
    /// Spawn `work` to run after `delay`. Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(id: DrawId, delay: Duration, work: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            work().await;
        });
        Self { id, handle }
    }

    /// Draw this completion belongs to.
    pub fn id(&self) -> DrawId {
        self.id
    }

    /// Abort the task. Has no effect once the work has finished.
    pub fn cancel(self) {
        self.handle.abort();
    }
}
