//! # Persistence Sink
//! Append-only `reddit_sentiment` table in SQLite. One transaction per run;
//! no uniqueness key, so overlapping fetch windows across runs produce
//! duplicate rows — that is the documented behavior, not a bug to fix here.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::model::{RawPost, ScoredPost};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS reddit_sentiment (
    id              TEXT    NOT NULL,
    title           TEXT    NOT NULL,
    selftext        TEXT    NOT NULL,
    created_utc     TEXT    NOT NULL,
    subreddit       TEXT    NOT NULL,
    score           INTEGER NOT NULL,
    sentiment_score REAL    NOT NULL,
    sentiment_label TEXT    NOT NULL
)";

pub struct SentimentStore {
    pool: SqlitePool,
}

impl SentimentStore {
    /// Connect and bootstrap the schema. The caller owns the store for the
    /// duration of a run; dropping it releases the connection on every exit
    /// path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let url = prepare_sqlite_url(database_url);
        let pool = SqlitePool::connect(&url)
            .await
            .with_context(|| format!("connecting to store at {url}"))?;
        // WAL keeps the dashboard's concurrent reads cheap.
        sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL;").execute(&pool).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Append a whole batch in a single transaction. Returns the number of
    /// rows written. An empty batch is a no-op.
    pub async fn append_batch(&self, batch: &[ScoredPost]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.context("opening store transaction")?;
        for post in batch {
            sqlx::query(
                "INSERT INTO reddit_sentiment
                 (id, title, selftext, created_utc, subreddit, score,
                  sentiment_score, sentiment_label)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&post.id)
            .bind(&post.title)
            .bind(&post.selftext)
            .bind(post.created_utc)
            .bind(&post.channel)
            .bind(post.score)
            .bind(post.sentiment_score)
            .bind(post.sentiment_label.as_str())
            .execute(&mut *tx)
            .await
            .context("appending row")?;
        }
        tx.commit().await.context("committing batch")?;
        Ok(batch.len() as u64)
    }

    /// All rows for one channel, oldest first. Label is re-derived from the
    /// score sign, which the construction invariant guarantees to match the
    /// stored text.
    pub async fn rows_for_channel(&self, channel: &str) -> Result<Vec<ScoredPost>> {
        let rows = sqlx::query(
            "SELECT id, title, selftext, created_utc, subreddit, score, sentiment_score
             FROM reddit_sentiment WHERE subreddit = ? ORDER BY created_utc ASC",
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await
        .context("reading channel rows")?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let raw = RawPost {
                    id: row.get("id"),
                    title: row.get("title"),
                    selftext: row.get("selftext"),
                    created_utc: row.get::<DateTime<Utc>, _>("created_utc"),
                    channel: row.get("subreddit"),
                    score: row.get("score"),
                };
                ScoredPost::from_raw(raw, row.get("sentiment_score"))
            })
            .collect())
    }

    /// Total row count, across all channels and runs.
    pub async fn count_rows(&self) -> Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reddit_sentiment")
            .fetch_one(&self.pool)
            .await
            .context("counting rows")?;
        Ok(n)
    }
}

/// For file-backed SQLite URLs, make sure the parent directory exists and ask
/// for create-if-missing. In-memory URLs and foreign schemes pass through.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }
    let path = url["sqlite:".len()..].trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return url.to_string();
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    format!("sqlite://{path}?mode=rwc")
}
