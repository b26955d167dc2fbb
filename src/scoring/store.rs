// src/scoring/store.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use super::RelativeScoring;

/// Persistence boundary for topic baselines.
///
/// Implementations must make `insert_or_get` and `upsert` atomic per topic:
/// concurrent first references to one topic end up with a single row.
#[async_trait::async_trait]
pub trait ScoringStore: Send + Sync {
    async fn get(&self, topic: &str) -> Result<Option<RelativeScoring>>;

    /// Insert `entry` unless the topic already exists; returns the stored row either way.
    async fn insert_or_get(&self, entry: RelativeScoring) -> Result<RelativeScoring>;

    /// Insert or overwrite the row for `entry.topic`.
    async fn upsert(&self, entry: RelativeScoring) -> Result<RelativeScoring>;

    /// The single stalest row updated at or before `cutoff`, if any.
    async fn next_to_refresh(&self, cutoff: DateTime<Utc>) -> Result<Option<RelativeScoring>>;
}

/// Process-local store, used by tests and single-node deployments.
#[derive(Debug, Default)]
pub struct MemoryScoringStore {
    rows: RwLock<HashMap<String, RelativeScoring>>,
}

impl MemoryScoringStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().expect("scoring store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ScoringStore for MemoryScoringStore {
    async fn get(&self, topic: &str) -> Result<Option<RelativeScoring>> {
        let rows = self.rows.read().expect("scoring store lock poisoned");
        Ok(rows.get(topic).cloned())
    }

    async fn insert_or_get(&self, entry: RelativeScoring) -> Result<RelativeScoring> {
        let mut rows = self.rows.write().expect("scoring store lock poisoned");
        Ok(rows.entry(entry.topic.clone()).or_insert(entry).clone())
    }

    async fn upsert(&self, entry: RelativeScoring) -> Result<RelativeScoring> {
        let mut rows = self.rows.write().expect("scoring store lock poisoned");
        rows.insert(entry.topic.clone(), entry.clone());
        Ok(entry)
    }

    async fn next_to_refresh(&self, cutoff: DateTime<Utc>) -> Result<Option<RelativeScoring>> {
        let rows = self.rows.read().expect("scoring store lock poisoned");
        Ok(rows
            .values()
            .filter(|r| r.last_updated <= cutoff)
            .min_by(|a, b| a.last_updated.cmp(&b.last_updated).then_with(|| a.topic.cmp(&b.topic)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn row(topic: &str, baseline: f64, at: DateTime<Utc>) -> RelativeScoring {
        RelativeScoring {
            topic: topic.into(),
            baseline_score: baseline,
            last_updated: at,
        }
    }

    #[tokio::test]
    async fn insert_or_get_keeps_first_row() {
        let store = MemoryScoringStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let a = store.insert_or_get(row("rust", 100.0, t0)).await.unwrap();
        let b = store.insert_or_get(row("rust", 999.0, t0)).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn next_to_refresh_is_oldest_before_cutoff() {
        let store = MemoryScoringStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        store.upsert(row("new", 1.0, t0 + Duration::days(3))).await.unwrap();
        store.upsert(row("mid", 1.0, t0 + Duration::days(1))).await.unwrap();
        store.upsert(row("old", 1.0, t0)).await.unwrap();

        let next = store.next_to_refresh(t0 + Duration::days(2)).await.unwrap();
        assert_eq!(next.map(|r| r.topic), Some("old".to_string()));
        assert_eq!(store.next_to_refresh(t0 - Duration::days(1)).await.unwrap(), None);
    }
}
