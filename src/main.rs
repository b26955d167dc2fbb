//! noscroll service: binary entrypoint.
//! Boots the Axum HTTP server and the baseline refresh worker.

use std::sync::Arc;

use noscroll::api::{create_router, AppState};
use noscroll::config;
use noscroll::metrics::Metrics;
use noscroll::scoring::scheduler::{spawn_refresh_task, RefreshSchedulerCfg};
use noscroll::scoring::{MemoryScoringStore, RedditTopSource, ScoringStore, TopScoreSource};
use noscroll::seen::MemorySeenStore;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact text logs by default, JSON lines when NOSCROLL_LOG_JSON=1.
fn init_tracing() {
    let json = std::env::var("NOSCROLL_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("noscroll=info,warn"));

    // The runtime may already have installed a subscriber; keep it in that case.
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    tracing::info!(
        task_delay_secs = cfg.task_delay_secs,
        refresh_secs = cfg.scoring.refresh_secs,
        "config loaded"
    );

    let metrics = match Metrics::init(cfg.scoring.refresh_secs, cfg.task_delay_secs) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = %e, "metrics disabled");
            None
        }
    };

    let store: Arc<dyn ScoringStore> = Arc::new(MemoryScoringStore::new());
    let source: Arc<dyn TopScoreSource> = Arc::new(
        RedditTopSource::new(&cfg.reddit_base_url, &cfg.user_agent)
            .with_timeout(cfg.request_timeout_secs),
    );

    spawn_refresh_task(
        RefreshSchedulerCfg {
            interval_secs: cfg.task_delay_secs,
        },
        store.clone(),
        source,
        cfg.scoring.clone(),
    );

    let state = AppState {
        scoring: store,
        seen: Arc::new(MemorySeenStore::new()),
    };
    let router = create_router(state, metrics.as_ref());
    Ok(router.into())
}
