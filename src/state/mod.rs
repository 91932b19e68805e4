pub mod draw;
pub mod entrant;
pub mod pool;
pub mod random;
pub mod reel;
pub mod schedule;
pub mod session;
mod sse;
pub mod state_machine;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    dao::repository::SessionRepository,
    services::collaborators::WinnerReporter,
    state::{
        draw::DrawMode,
        random::{RandomSource, ThreadRandom},
        schedule::ScheduledCompletion,
        session::{DrawRejected, DrawSession, DrawStart},
        state_machine::DrawId,
    },
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Time between accepting a draw and committing it; matches the reel animation.
pub const DRAW_DURATION: Duration = Duration::from_secs(6);

/// Central application state: the draw session plus its collaborators.
pub struct AppState {
    session: RwLock<DrawSession>,
    repository: SessionRepository,
    reporter: Arc<dyn WinnerReporter>,
    config: Arc<AppConfig>,
    rng: Mutex<Box<dyn RandomSource>>,
    sse: SseHub,
    pending: Mutex<Option<ScheduledCompletion>>,
    draw_duration: Duration,
    disposed: AtomicBool,
}

/// Optional knobs for [`AppState::with_options`].
pub struct StateOptions {
    /// Randomness used for selection and reel shuffles.
    pub rng: Box<dyn RandomSource>,
    /// Delay before a draw completes.
    pub draw_duration: Duration,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            rng: Box::new(ThreadRandom),
            draw_duration: DRAW_DURATION,
        }
    }
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        repository: SessionRepository,
        reporter: Arc<dyn WinnerReporter>,
    ) -> SharedState {
        Self::with_options(config, repository, reporter, StateOptions::default())
    }

    /// Same as [`AppState::new`] with an explicit random source and draw delay.
    pub fn with_options(
        config: AppConfig,
        repository: SessionRepository,
        reporter: Arc<dyn WinnerReporter>,
        options: StateOptions,
    ) -> SharedState {
        let session = DrawSession::new(config.designated_region.clone(), config.settings);
        Arc::new(Self {
            session: RwLock::new(session),
            repository,
            reporter,
            config: Arc::new(config),
            rng: Mutex::new(options.rng),
            sse: SseHub::new(32),
            pending: Mutex::new(None),
            draw_duration: options.draw_duration,
            disposed: AtomicBool::new(false),
        })
    }

    /// The draw session.
    pub fn session(&self) -> &RwLock<DrawSession> {
        &self.session
    }

    /// Typed access to durable state.
    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    /// Remote winner-report sink.
    pub fn reporter(&self) -> Arc<dyn WinnerReporter> {
        Arc::clone(&self.reporter)
    }

    /// Immutable configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Broadcast hub used for the SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Delay between a draw request and its completion.
    pub fn draw_duration(&self) -> Duration {
        self.draw_duration
    }

    /// Whether [`AppState::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Accept a draw on the session using the shared random source.
    pub async fn begin_draw(&self, mode: DrawMode) -> Result<DrawStart, DrawRejected> {
        let mut rng = self.rng.lock().await;
        let mut session = self.session.write().await;
        session.begin_draw(mode, &mut *rng)
    }

    /// Keep the handle of the completion scheduled for the pending draw.
    pub async fn install_completion(&self, completion: ScheduledCompletion) {
        let mut slot = self.pending.lock().await;
        if let Some(previous) = slot.replace(completion) {
            debug!(draw_id = %previous.id(), "replacing settled completion handle");
        }
    }

    /// Forget the completion handle of `id` once it has run.
    pub async fn release_completion(&self, id: DrawId) {
        let mut slot = self.pending.lock().await;
        if slot.as_ref().is_some_and(|task| task.id() == id) {
            slot.take();
        }
    }

    /// Abort the scheduled completion and drop the pending draw. Returns the cancelled id.
    pub async fn cancel_pending(&self) -> Option<DrawId> {
        if let Some(task) = self.pending.lock().await.take() {
            task.cancel();
        }

        let mut session = self.session.write().await;
        let id = session.pending_draw()?;
        session.cancel_draw(id).ok()?;
        Some(id)
    }

    /// Tear the session down: no completion may mutate state afterwards.
    pub async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(id) = self.cancel_pending().await {
            info!(draw_id = %id, "pending draw cancelled on shutdown");
        }
    }
}
