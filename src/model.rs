// src/model.rs
// Canonical records flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One post as fetched from a channel, after defensive normalization.
/// Ephemeral: consumed immediately by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub created_utc: DateTime<Utc>,
    /// Subreddit name, e.g. "technology".
    pub channel: String,
    /// Engagement score (upvotes minus downvotes).
    pub score: i64,
}

/// Three-way classification derived from the sign of the sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Sign rule: > 0 positive, < 0 negative, exactly 0 neutral.
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

/// A scored post. Label is always derived from the score at construction;
/// there is no way to build one with a mismatched pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub created_utc: DateTime<Utc>,
    pub channel: String,
    pub score: i64,
    /// Polarity of the title in [-1, 1].
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

impl ScoredPost {
    pub fn from_raw(raw: RawPost, sentiment_score: f64) -> Self {
        let sentiment_label = SentimentLabel::from_score(sentiment_score);
        Self {
            id: raw.id,
            title: raw.title,
            selftext: raw.selftext,
            created_utc: raw.created_utc,
            channel: raw.channel,
            score: raw.score,
            sentiment_score,
            sentiment_label,
        }
    }
}
