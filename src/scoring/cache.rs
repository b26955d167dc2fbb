// src/scoring/cache.rs
//! Batch-scoped baseline cache.
//!
//! One `ScoringCache` lives for one sync pass. It memoizes baselines it has
//! already seen during the pass and falls back to the store, then to the
//! content source, for topics it has not. The store stays the source of truth
//! across passes.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{mean, normalize, RelativeScoring, ScoringError, ScoringStore, TopScoreSource};
use crate::config::ScoringConfig;
use crate::link::Link;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        metrics::describe_counter!(
            "scoring_baseline_fetch_total",
            "Baselines computed from the content source."
        );
        metrics::describe_counter!("scoring_refresh_total", "Stale baselines recomputed.");
        metrics::describe_counter!("scoring_errors_total", "Baseline or normalization failures.");
    });
}

pub struct ScoringCache {
    store: Arc<dyn ScoringStore>,
    source: Arc<dyn TopScoreSource>,
    cfg: ScoringConfig,
    now: DateTime<Utc>,
    entries: HashMap<String, RelativeScoring>,
    rng: StdRng,
}

impl ScoringCache {
    /// `now` is the timestamp of the pass; all rows written by it derive from it.
    pub fn new(
        store: Arc<dyn ScoringStore>,
        source: Arc<dyn TopScoreSource>,
        cfg: ScoringConfig,
        now: DateTime<Utc>,
    ) -> Self {
        ensure_metrics_described();
        Self {
            store,
            source,
            cfg,
            now,
            entries: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic jitter for tests and replays.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Rows last updated at or before this instant are due for a refresh.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.now - self.cfg.refresh_interval()
    }

    /// Baseline for `topic`: this pass's memo, then the store, then a fresh fetch.
    ///
    /// A freshly built row is backdated by a random fraction of the refresh
    /// interval so topics first seen together do not all expire together.
    pub async fn get_or_create(&mut self, topic: &str) -> Result<RelativeScoring, ScoringError> {
        let key = topic_key(topic);
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }

        let stored = self.store.get(&key).await.map_err(ScoringError::Store)?;
        let row = match stored {
            Some(row) => row,
            None => {
                let baseline = self.fetch_baseline(&key).await?;
                let fresh = RelativeScoring {
                    topic: key.clone(),
                    baseline_score: baseline,
                    last_updated: self.now - self.jitter(),
                };
                let row = self
                    .store
                    .insert_or_get(fresh)
                    .await
                    .map_err(ScoringError::Store)?;
                info!(target: "scoring", topic = %row.topic, baseline = row.baseline_score, "baseline created");
                row
            }
        };

        self.entries.insert(key, row.clone());
        Ok(row)
    }

    /// Normalized score of `raw_score` within `topic`.
    pub async fn normalize_score(&mut self, raw_score: i64, topic: &str) -> Result<f64, ScoringError> {
        let row = self.get_or_create(topic).await?;
        normalize(raw_score as f64, row.baseline_score)
    }

    /// Recompute the single stalest baseline updated at or before `cutoff`.
    /// Returns the refreshed row, or `None` when nothing is due. A row whose
    /// recomputation fails keeps its baseline and is stamped with `now`.
    pub async fn refresh_due(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<RelativeScoring>, ScoringError> {
        let Some(stale) = self
            .store
            .next_to_refresh(cutoff)
            .await
            .map_err(ScoringError::Store)?
        else {
            debug!(target: "scoring", %cutoff, "no baseline due for refresh");
            return Ok(None);
        };

        let baseline = match self.fetch_baseline(&stale.topic).await {
            Ok(baseline) => baseline,
            Err(e) => {
                self.reschedule(&stale).await;
                return Err(e);
            }
        };
        let row = self
            .store
            .upsert(RelativeScoring {
                topic: stale.topic.clone(),
                baseline_score: baseline,
                last_updated: self.now,
            })
            .await
            .map_err(ScoringError::Store)?;

        counter!("scoring_refresh_total").increment(1);
        info!(
            target: "scoring",
            topic = %row.topic,
            previous = stale.baseline_score,
            baseline = row.baseline_score,
            "baseline refreshed"
        );
        self.entries.insert(row.topic.clone(), row.clone());
        Ok(Some(row))
    }

    /// Move the row to the back of the refresh queue, previous baseline kept.
    async fn reschedule(&self, stale: &RelativeScoring) {
        let row = RelativeScoring {
            topic: stale.topic.clone(),
            baseline_score: stale.baseline_score,
            last_updated: self.now,
        };
        match self.store.upsert(row).await {
            Ok(row) => {
                debug!(target: "scoring", topic = %row.topic, until = %row.last_updated, "refresh postponed");
            }
            Err(e) => {
                warn!(target: "scoring", topic = %stale.topic, error = %e, "could not postpone refresh");
            }
        }
    }

    /// Set `relative_score` on every reddit link in the batch.
    ///
    /// Links whose baseline cannot be obtained keep their previous relative
    /// score and are returned with the error, so the rest of the pass goes on.
    pub async fn apply_relative_scores(&mut self, links: &mut [Link]) -> Vec<(String, ScoringError)> {
        let mut deferred = Vec::new();
        for link in links.iter_mut() {
            let Some(topic) = link.subreddit().map(str::to_owned) else {
                continue;
            };
            match self.normalize_score(link.score, &topic).await {
                Ok(relative) => link.relative_score = relative.round() as i64,
                Err(e) => {
                    counter!("scoring_errors_total").increment(1);
                    warn!(
                        target: "scoring",
                        link = %link.id,
                        topic = %topic,
                        retryable = e.is_retryable(),
                        error = %e,
                        "relative score deferred"
                    );
                    deferred.push((link.id.clone(), e));
                }
            }
        }
        deferred
    }

    async fn fetch_baseline(&self, topic: &str) -> Result<f64, ScoringError> {
        let scores = self
            .source
            .top_scores(topic, self.cfg.top_window, self.cfg.top_limit)
            .await
            .map_err(|source| ScoringError::Fetch {
                topic: topic.to_string(),
                source,
            })?;
        counter!("scoring_baseline_fetch_total").increment(1);

        let sample = &scores[..scores.len().min(self.cfg.top_limit)];
        let baseline = mean(sample).ok_or_else(|| ScoringError::EmptySample {
            topic: topic.to_string(),
        })?;
        if !baseline.is_finite() || baseline <= 0.0 {
            return Err(ScoringError::NonPositiveBaseline { baseline });
        }
        debug!(
            target: "scoring",
            topic,
            source = self.source.name(),
            samples = sample.len(),
            baseline,
            "baseline computed"
        );
        Ok(baseline)
    }

    /// Uniform in `[0, refresh_interval)`.
    fn jitter(&mut self) -> Duration {
        let interval_ms = self.cfg.refresh_interval().num_milliseconds().max(0);
        let frac: f64 = self.rng.random();
        Duration::milliseconds((interval_ms as f64 * frac) as i64)
    }
}

/// Subreddit names are case-insensitive.
fn topic_key(topic: &str) -> String {
    topic.trim().to_ascii_lowercase()
}
