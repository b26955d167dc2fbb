// src/link.rs
//! Link records built from upstream submissions, and their API view.
//!
//! Only normalized metadata is kept on a link. The preview is not stored; it
//! is recomputed from that metadata whenever a `Submission` is built.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::ValueExt;
use crate::embed::{self, layout, Embed};
use crate::metadata::{self, NormalizedMetadata};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Stable key across sources: `reddit:<id>` or `hn:<id>`.
    pub id: String,
    pub hn_id: Option<u64>,
    pub reddit_id: Option<String>,
    pub title: String,
    pub posted_at: DateTime<Utc>,
    pub score: i64,
    pub relative_score: i64,
    pub is_read: bool,
    pub is_saved: bool,
    pub metadata: NormalizedMetadata,
}

impl Link {
    /// Build from a raw reddit submission object.
    pub fn from_reddit(raw: &Value) -> Result<Self> {
        let reddit_id = raw
            .field("id")
            .non_empty_str()
            .ok_or_else(|| anyhow!("reddit submission without id"))?
            .to_string();
        let title = raw
            .field("title")
            .as_str()
            .with_context(|| format!("reddit submission {reddit_id} without title"))?
            .to_string();
        let posted_at = timestamp(raw.field("created_utc"))
            .with_context(|| format!("reddit submission {reddit_id} without created_utc"))?;

        Ok(Self {
            id: format!("reddit:{reddit_id}"),
            hn_id: None,
            reddit_id: Some(reddit_id),
            title,
            posted_at,
            score: raw.field("score").as_i64().unwrap_or(0),
            relative_score: 0,
            is_read: false,
            is_saved: false,
            metadata: metadata::normalize(raw),
        })
    }

    /// Build from a Hacker News item. Job postings are not links: `Ok(None)`.
    pub fn from_hn_item(item: &Value) -> Result<Option<Self>> {
        if item.field("type").as_str() == Some("job") {
            return Ok(None);
        }
        let hn_id = item
            .field("id")
            .as_u64()
            .ok_or_else(|| anyhow!("hn item without id"))?;
        let title = item
            .field("title")
            .as_str()
            .with_context(|| format!("hn item {hn_id} without title"))?
            .to_string();
        let posted_at = timestamp(item.field("time"))
            .with_context(|| format!("hn item {hn_id} without time"))?;

        let metadata = NormalizedMetadata {
            id: Some(hn_id.to_string()),
            is_self: Some(item.field("url").non_empty_str().is_none()),
            num_comments: item.field("descendants").as_i64(),
            url: item.field("url").as_str().map(str::to_owned),
            ..Default::default()
        };

        Ok(Some(Self {
            id: format!("hn:{hn_id}"),
            hn_id: Some(hn_id),
            reddit_id: None,
            title,
            posted_at,
            score: item.field("score").as_i64().unwrap_or(0),
            relative_score: 0,
            is_read: false,
            is_saved: false,
            metadata,
        }))
    }

    pub fn subreddit(&self) -> Option<&str> {
        self.reddit_id.as_ref()?;
        self.metadata.subreddit.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.metadata.url.as_deref()
    }

    pub fn permalink(&self) -> Option<&str> {
        self.metadata.permalink.as_deref()
    }

    pub fn num_comments(&self) -> Option<i64> {
        self.metadata.num_comments
    }

    /// Discussion page of the link on its source site.
    pub fn absolute_url(&self) -> Option<String> {
        if let Some(hn_id) = self.hn_id {
            return Some(format!("https://news.ycombinator.com/item?id={hn_id}"));
        }
        self.reddit_id.as_ref()?;
        self.permalink()
            .map(|p| format!("https://old.reddit.com{p}"))
    }

    /// Preview recomputed from stored metadata. Hacker News items have none.
    pub fn embed(&self) -> Option<Embed> {
        self.reddit_id.as_ref()?;
        embed::resolve(&self.metadata)
    }

    /// Hosted-player iframe for reddit videos, sized to the clip.
    pub fn video_iframe(&self) -> Option<String> {
        self.reddit_id.as_ref()?;
        layout::reddit_video_iframe(&self.metadata)
    }

    /// Take score and title from a fresher copy of the same link.
    /// Returns the names of the fields that changed.
    pub fn merge_update(&mut self, fresh: &Link) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if fresh.score != self.score {
            self.score = fresh.score;
            changed.push("score");
        }
        if fresh.title != self.title {
            self.title = fresh.title.clone();
            changed.push("title");
        }
        changed
    }

    pub fn submission(&self) -> Submission {
        Submission {
            id: self.id.clone(),
            reddit_id: self.reddit_id.clone(),
            title: self.title.clone(),
            posted_at: self.posted_at,
            subreddit: self.subreddit().map(str::to_owned),
            score: self.score,
            relative_score: self.relative_score,
            url: self.url().map(str::to_owned),
            permalink: self.permalink().map(str::to_owned),
            num_comments: self.num_comments(),
            is_read: self.is_read,
            is_saved: self.is_saved,
            embed: self.embed(),
            video_iframe: self.video_iframe(),
        }
    }
}

/// Serialized shape consumed by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub reddit_id: Option<String>,
    pub title: String,
    pub posted_at: DateTime<Utc>,
    pub subreddit: Option<String>,
    pub score: i64,
    pub relative_score: i64,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub num_comments: Option<i64>,
    pub is_read: bool,
    pub is_saved: bool,
    pub embed: Option<Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_iframe: Option<String>,
}

fn timestamp(v: &Value) -> Option<DateTime<Utc>> {
    let secs = v.as_f64()?;
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_update_reports_changes() {
        let mut a = Link::from_reddit(&json!({ "id": "x1", "title": "Old", "created_utc": 1.0, "score": 5 })).unwrap();
        let b = Link::from_reddit(&json!({ "id": "x1", "title": "New", "created_utc": 1.0, "score": 5 })).unwrap();
        assert_eq!(a.merge_update(&b), vec!["title"]);
        assert_eq!(a.title, "New");
        assert!(a.merge_update(&b).is_empty());
    }

    #[test]
    fn timestamps_truncate_fractional_seconds() {
        let t = timestamp(&json!(1_600_000_000.75)).unwrap();
        assert_eq!(t.timestamp(), 1_600_000_000);
        assert_eq!(timestamp(&json!("soon")), None);
    }
}
