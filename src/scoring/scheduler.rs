// src/scoring/scheduler.rs
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{RelativeScoring, ScoringCache, ScoringError, ScoringStore, TopScoreSource};
use crate::config::ScoringConfig;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        metrics::describe_counter!("scoring_refresh_runs_total", "Refresh worker ticks.");
        metrics::describe_gauge!(
            "scoring_refresh_last_run_ts",
            "Unix time of the last refresh worker tick."
        );
    });
}

#[derive(Clone, Copy, Debug)]
pub struct RefreshSchedulerCfg {
    pub interval_secs: u64,
}

/// One refresh step at `now`: at most one stale baseline is recomputed.
pub async fn run_refresh_once(
    store: Arc<dyn ScoringStore>,
    source: Arc<dyn TopScoreSource>,
    cfg: ScoringConfig,
    now: DateTime<Utc>,
) -> Result<Option<RelativeScoring>, ScoringError> {
    let mut cache = ScoringCache::new(store, source, cfg, now);
    let cutoff = cache.cutoff();
    cache.refresh_due(cutoff).await
}

/// Spawn the background refresh loop. A failed step is logged and retried on
/// the next tick; the loop itself never exits.
pub fn spawn_refresh_task(
    sched: RefreshSchedulerCfg,
    store: Arc<dyn ScoringStore>,
    source: Arc<dyn TopScoreSource>,
    cfg: ScoringConfig,
) -> JoinHandle<()> {
    ensure_metrics_described();
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(sched.interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        tracing::info!(target: "scoring", interval_secs = period.as_secs(), "refresh task started");
        loop {
            ticker.tick().await;
            let now = Utc::now();

            match run_refresh_once(store.clone(), source.clone(), cfg.clone(), now).await {
                Ok(Some(row)) => {
                    tracing::debug!(target: "scoring", topic = %row.topic, "refresh tick");
                }
                Ok(None) => {}
                Err(e) => {
                    counter!("scoring_errors_total").increment(1);
                    tracing::warn!(
                        target: "scoring",
                        error = %e,
                        retryable = e.is_retryable(),
                        "refresh tick failed"
                    );
                }
            }
            counter!("scoring_refresh_runs_total").increment(1);
            gauge!("scoring_refresh_last_run_ts").set(now.timestamp() as f64);
        }
    })
}
