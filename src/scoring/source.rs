// src/scoring/source.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::access::ValueExt;

/// Time window of a top-submissions listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopWindow {
    Hour,
    Day,
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl TopWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopWindow::Hour => "hour",
            TopWindow::Day => "day",
            TopWindow::Week => "week",
            TopWindow::Month => "month",
            TopWindow::Year => "year",
            TopWindow::All => "all",
        }
    }
}

/// Scores of a topic's recent top submissions.
///
/// Errors are expected to be transient (network, rate limiting) and are
/// surfaced to the caller as retryable.
#[async_trait]
pub trait TopScoreSource: Send + Sync {
    async fn top_scores(&self, topic: &str, window: TopWindow, limit: usize) -> Result<Vec<i64>>;
    fn name(&self) -> &'static str;
}

/// Reads reddit's public `top.json` listings.
#[derive(Clone)]
pub struct RedditTopSource {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl RedditTopSource {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn listing_url(&self, topic: &str, window: TopWindow, limit: usize) -> String {
        format!(
            "{}/r/{}/top.json?t={}&limit={}",
            self.base_url,
            topic,
            window.as_str(),
            limit
        )
    }
}

#[async_trait]
impl TopScoreSource for RedditTopSource {
    async fn top_scores(&self, topic: &str, window: TopWindow, limit: usize) -> Result<Vec<i64>> {
        let url = self.listing_url(topic, window, limit);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(anyhow!("rate limited by reddit for r/{topic}"));
        }
        if !status.is_success() {
            return Err(anyhow!("reddit returned {status} for r/{topic}"));
        }

        let body: Value = resp.json().await.context("decoding reddit listing")?;
        let mut scores = parse_listing_scores(&body);
        scores.truncate(limit);
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}

/// Scores of every child in a reddit listing; children without a score are skipped.
pub fn parse_listing_scores(listing: &Value) -> Vec<i64> {
    listing
        .field("data")
        .field("children")
        .items()
        .iter()
        .filter_map(|child| child.field("data").field("score").as_i64())
        .collect()
}
