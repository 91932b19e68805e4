//! Lucky Draw Back binary entrypoint wiring the draw session, storage, remote collaborators and HTTP/SSE layers.

use std::{env, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lucky_draw_back::{
    config::AppConfig,
    dao::{
        repository::SessionRepository,
        session_store::{SessionStore, file::FileSessionStore, memory::MemorySessionStore},
    },
    routes,
    services::{
        collaborators::{EntrantFeed, WinnerReporter},
        pool_service,
    },
    state::{AppState, SharedState},
};

type Collaborators = (Arc<dyn EntrantFeed>, Arc<dyn WinnerReporter>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(&config.state_dir).await;
    let (feed, reporter) = collaborators(&config)?;

    let app_state = AppState::new(config, SessionRepository::new(store), reporter);
    pool_service::restore_session(&app_state).await;

    // The show can start on the cached pool while the feed is fetched.
    tokio::spawn({
        let state = app_state.clone();
        async move {
            pool_service::load_initial_pool(&state, feed.as_ref()).await;
        }
    });

    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    app_state.dispose().await;
    Ok(())
}

/// Open the file-backed store, falling back to memory so draws keep working.
async fn open_store(dir: &Path) -> Arc<dyn SessionStore> {
    match FileSessionStore::open(dir).await {
        Ok(store) => {
            info!(dir = %dir.display(), "using file session store");
            Arc::new(store)
        }
        Err(err) => {
            warn!(
                dir = %dir.display(),
                error = %err,
                "cannot open state directory; session will not survive restarts"
            );
            Arc::new(MemorySessionStore::new())
        }
    }
}

#[cfg(feature = "remote")]
fn collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    use std::time::Duration;

    use lucky_draw_back::services::{
        collaborators::{NoopFeed, NoopReporter},
        remote::{HttpEntrantFeed, HttpWinnerReporter},
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("building HTTP client")?;

    let feed: Arc<dyn EntrantFeed> = match &config.feed_url {
        Some(url) => Arc::new(HttpEntrantFeed::new(
            client.clone(),
            url.clone(),
            config.event_id.clone(),
        )),
        None => Arc::new(NoopFeed),
    };
    let reporter: Arc<dyn WinnerReporter> = match &config.report_url {
        Some(url) => Arc::new(HttpWinnerReporter::new(client, url.clone())),
        None => Arc::new(NoopReporter),
    };
    Ok((feed, reporter))
}

#[cfg(not(feature = "remote"))]
fn collaborators(config: &AppConfig) -> anyhow::Result<Collaborators> {
    use lucky_draw_back::services::collaborators::{NoopFeed, NoopReporter};

    if config.feed_url.is_some() || config.report_url.is_some() {
        warn!("remote collaborators configured but the `remote` feature is disabled");
    }
    Ok((Arc::new(NoopFeed), Arc::new(NoopReporter)))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
