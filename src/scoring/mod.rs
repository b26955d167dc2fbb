// src/scoring/mod.rs
//! # Relative Scoring
//! Puts raw reddit scores from very differently sized subreddits on one scale.
//!
//! Each topic (subreddit) has a baseline: the mean score of its recent top
//! submissions. A raw score is normalized as `raw / baseline * 1000`, so a
//! submission as popular as a typical top post of its own community lands
//! near 1000 regardless of how big that community is.
//!
//! Baselines are built lazily on first reference, stored through
//! [`store::ScoringStore`], and refreshed one at a time by the background
//! worker in [`scheduler`].

pub mod cache;
pub mod scheduler;
pub mod source;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::ScoringCache;
pub use source::{RedditTopSource, TopScoreSource, TopWindow};
pub use store::{MemoryScoringStore, ScoringStore};

/// Normalized score of a submission exactly as popular as its baseline.
pub const SCALE: f64 = 1000.0;

/// Stored baseline for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeScoring {
    pub topic: String,
    pub baseline_score: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("baseline must be positive, got {baseline}")]
    NonPositiveBaseline { baseline: f64 },

    #[error("no top submissions available for r/{topic}")]
    EmptySample { topic: String },

    #[error("fetching top submissions for r/{topic} failed: {source}")]
    Fetch {
        topic: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("scoring store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl ScoringError {
    /// Whether the surrounding retry loop should try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Fetch { .. } | ScoringError::Store(_))
    }
}

/// `raw / baseline * 1000`. Non-positive or non-finite baselines are rejected.
pub fn normalize(raw_score: f64, baseline: f64) -> Result<f64, ScoringError> {
    if !baseline.is_finite() || baseline <= 0.0 {
        return Err(ScoringError::NonPositiveBaseline { baseline });
    }
    Ok(raw_score / baseline * SCALE)
}

/// Mean of a score sample, `None` when empty.
pub fn mean(scores: &[i64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: f64 = scores.iter().map(|s| *s as f64).sum();
    Some(sum / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_against_baseline() {
        assert_eq!(normalize(500.0, 250.0).unwrap(), 2000.0);
        assert_eq!(normalize(0.0, 250.0).unwrap(), 0.0);
    }

    #[test]
    fn zero_baseline_is_a_domain_error() {
        let err = normalize(42.0, 0.0).unwrap_err();
        assert!(matches!(err, ScoringError::NonPositiveBaseline { .. }));
        assert!(!err.is_retryable());
        assert!(normalize(42.0, -3.0).is_err());
        assert!(normalize(42.0, f64::NAN).is_err());
    }

    #[test]
    fn mean_of_sample() {
        assert_eq!(mean(&[100, 200, 300]), Some(200.0));
        assert_eq!(mean(&[]), None);
    }
}
