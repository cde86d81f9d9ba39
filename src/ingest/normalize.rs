// src/ingest/normalize.rs
// Pure, defensive mapping from a provider wire record to a canonical RawPost.
// No side effects, no external calls.

use chrono::{DateTime, TimeZone, Utc};

use crate::ingest::providers::reddit::RedditPostData;
use crate::model::RawPost;

/// Placeholder for posts that arrive without a title.
pub const MISSING_TITLE: &str = "(no title)";

/// Title length cap after cleanup.
const MAX_TITLE_CHARS: usize = 500;

/// Normalize title text: decode HTML entities, strip tags, collapse
/// whitespace, trim, cap length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode (Reddit titles carry &amp; and friends)
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap
    if out.chars().count() > MAX_TITLE_CHARS {
        out = out.chars().take(MAX_TITLE_CHARS).collect();
    }

    out
}

/// Map one wire record to a RawPost, filling safe defaults for anything the
/// provider left out: placeholder title, empty body, zero engagement,
/// `fetched_at` when the epoch is missing or out of range.
pub fn raw_post_from_reddit(
    data: RedditPostData,
    channel: &str,
    fetched_at: DateTime<Utc>,
) -> RawPost {
    let title = match data.title.as_deref().map(normalize_text) {
        Some(t) if !t.is_empty() => t,
        _ => MISSING_TITLE.to_string(),
    };

    let created_utc = data
        .created_utc
        .and_then(|secs| epoch_to_utc(secs))
        .unwrap_or(fetched_at);

    RawPost {
        id: data.id.unwrap_or_default(),
        title,
        selftext: data.selftext.unwrap_or_default(),
        created_utc,
        channel: data.subreddit.unwrap_or_else(|| channel.to_string()),
        score: data.score.unwrap_or(0),
    }
}

/// Provider epochs are float seconds; interpret as an absolute UTC instant.
fn epoch_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Utc.timestamp_opt(secs as i64, 0).single()
}
