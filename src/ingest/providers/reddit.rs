// src/ingest/providers/reddit.rs
// HTTP client for the per-subreddit "newest posts" listing endpoint.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::ingest::normalize::raw_post_from_reddit;
use crate::ingest::providers::SourceClient;
use crate::model::RawPost;

/// Wire shape of a listing response: `{"data":{"children":[{"data":{...}}]}}`.
/// Anything outside this shape is a decode error, not a silent coercion.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    #[serde(default)]
    data: RedditPostData,
}

/// One post as the provider sends it. Every field is optional; the
/// normalizer resolves absences to safe defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RedditPostData {
    pub id: Option<String>,
    pub title: Option<String>,
    pub selftext: Option<String>,
    /// Epoch seconds; the provider serializes this as a float.
    pub created_utc: Option<f64>,
    pub subreddit: Option<String>,
    pub score: Option<i64>,
}

/// Failure taxonomy for one fetch. Both variants are recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct RedditClient {
    http: reqwest::Client,
    base_url: String,
}

impl RedditClient {
    /// The provider rejects default library user agents, so the identifying
    /// header is set once on the underlying client.
    pub fn from_config(cfg: &FetchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_listing(&self, channel: &str, limit: u32) -> Result<Vec<RawPost>, FetchError> {
        let url = format!("{}/r/{}/new.json?limit={}", self.base_url, channel, limit);
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        posts_from_listing(&body, channel, Utc::now())
    }
}

/// Decode a listing body and normalize every child into a RawPost.
/// `fetched_at` is the timestamp fallback for children without an epoch.
fn posts_from_listing(
    body: &str,
    channel: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<RawPost>, FetchError> {
    let t0 = std::time::Instant::now();
    let listing: Listing = serde_json::from_str(body)?;

    let out: Vec<RawPost> = listing
        .data
        .children
        .into_iter()
        .map(|c| raw_post_from_reddit(c.data, channel, fetched_at))
        .collect();

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_posts_fetched_total").increment(out.len() as u64);
    Ok(out)
}

#[async_trait]
impl SourceClient for RedditClient {
    /// Transport and decode failures are recovered here: the channel yields
    /// an empty sequence and a warning, never an error into the caller.
    async fn fetch_newest(&self, channel: &str, limit: u32) -> Result<Vec<RawPost>> {
        match self.fetch_listing(channel, limit).await {
            Ok(posts) => {
                tracing::debug!(channel, count = posts.len(), "fetched listing");
                Ok(posts)
            }
            Err(e) => {
                tracing::warn!(error = %e, channel, "reddit fetch failed, skipping channel");
                counter!("ingest_fetch_errors_total").increment(1);
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
