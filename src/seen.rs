// src/seen.rs
//! Per-user read state for feed submissions.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::link::Link;

/// Which submissions a user has already scrolled past.
///
/// `mark_seen` is idempotent: marking an id twice keeps a single entry.
#[async_trait::async_trait]
pub trait SeenStore: Send + Sync {
    async fn mark_seen(&self, user_id: &str, ids: &[String]) -> Result<()>;

    /// The subset of `ids` the user has seen, in the order given.
    async fn seen_ids(&self, user_id: &str, ids: &[String]) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct MemorySeenStore {
    users: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SeenStore for MemorySeenStore {
    async fn mark_seen(&self, user_id: &str, ids: &[String]) -> Result<()> {
        let mut users = self.users.write().expect("seen store lock poisoned");
        users
            .entry(user_id.to_string())
            .or_default()
            .extend(ids.iter().cloned());
        Ok(())
    }

    async fn seen_ids(&self, user_id: &str, ids: &[String]) -> Result<Vec<String>> {
        let users = self.users.read().expect("seen store lock poisoned");
        let Some(seen) = users.get(user_id) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter(|id| seen.contains(*id)).cloned().collect())
    }
}

/// Flag the links the user has already seen as read.
pub async fn apply_seen(store: &dyn SeenStore, user_id: &str, links: &mut [Link]) -> Result<()> {
    let ids: Vec<String> = links.iter().map(|l| l.id.clone()).collect();
    let seen: HashSet<String> = store.seen_ids(user_id, &ids).await?.into_iter().collect();
    for link in links.iter_mut() {
        if seen.contains(&link.id) {
            link.is_read = true;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn marks_are_per_user_and_idempotent() {
        let store = MemorySeenStore::new();
        store.mark_seen("alice", &ids(&["reddit:a", "reddit:b"])).await.unwrap();
        store.mark_seen("alice", &ids(&["reddit:a"])).await.unwrap();

        let got = store
            .seen_ids("alice", &ids(&["reddit:c", "reddit:b", "reddit:a"]))
            .await
            .unwrap();
        assert_eq!(got, ids(&["reddit:b", "reddit:a"]));
        assert!(store.seen_ids("bob", &ids(&["reddit:a"])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_seen_flags_links() {
        let store = MemorySeenStore::new();
        store.mark_seen("alice", &ids(&["reddit:x1"])).await.unwrap();

        let mut links = vec![
            Link::from_reddit(&json!({ "id": "x1", "title": "A", "created_utc": 1 })).unwrap(),
            Link::from_reddit(&json!({ "id": "x2", "title": "B", "created_utc": 1 })).unwrap(),
        ];
        apply_seen(&store, "alice", &mut links).await.unwrap();
        assert!(links[0].is_read);
        assert!(!links[1].is_read);
    }
}
