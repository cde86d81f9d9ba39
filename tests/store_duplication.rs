// tests/store_duplication.rs
// The store is append-only with no dedup key: overlapping fetch windows
// across runs are expected to produce duplicate rows, and earlier rows are
// never mutated. These tests assert the duplication happens, not that it is
// prevented.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reddit_sentiment_tracker::{
    config::ChannelSpec, ingest, model::RawPost, ScoredPost, SentimentAnalyzer, SentimentStore,
    SourceClient,
};

fn raw(id: &str, title: &str, ts: i64) -> RawPost {
    RawPost {
        id: id.into(),
        title: title.into(),
        selftext: String::new(),
        created_utc: Utc.timestamp_opt(ts, 0).unwrap(),
        channel: "technology".into(),
        score: 7,
    }
}

async fn store_in(dir: &tempfile::TempDir) -> SentimentStore {
    let url = format!("sqlite://{}/test.db", dir.path().display());
    SentimentStore::connect(&url).await.expect("connect store")
}

#[tokio::test]
async fn appending_the_same_batch_twice_doubles_the_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp).await;
    let analyzer = SentimentAnalyzer::new();

    let batch: Vec<ScoredPost> = vec![
        analyzer.score_post(raw("a1", "great news", 100)),
        analyzer.score_post(raw("a2", "terrible failure", 200)),
    ];

    store.append_batch(&batch).await.unwrap();
    let first_run = store.rows_for_channel("technology").await.unwrap();
    assert_eq!(first_run.len(), 2);

    store.append_batch(&batch).await.unwrap();
    let after_second = store.rows_for_channel("technology").await.unwrap();
    assert_eq!(after_second.len(), 4);

    // Every row of the first run is still present, unmodified.
    for row in &first_run {
        assert!(
            after_second.iter().any(|r| r == row),
            "row {} was mutated or lost",
            row.id
        );
    }
    // Each logical post now appears exactly twice.
    for id in ["a1", "a2"] {
        assert_eq!(after_second.iter().filter(|r| r.id == id).count(), 2);
    }
}

#[tokio::test]
async fn empty_batch_append_is_a_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp).await;
    assert_eq!(store.append_batch(&[]).await.unwrap(), 0);
    assert_eq!(store.count_rows().await.unwrap(), 0);
}

/// Same fetch window served on two consecutive runs.
struct OverlappingWindow;

#[async_trait]
impl SourceClient for OverlappingWindow {
    async fn fetch_newest(&self, _channel: &str, _limit: u32) -> Result<Vec<RawPost>> {
        Ok(vec![raw("x1", "promising discovery", 1_000)])
    }
    fn name(&self) -> &'static str {
        "overlapping"
    }
}

#[tokio::test]
async fn two_runs_over_an_overlapping_window_duplicate_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp).await;
    let analyzer = SentimentAnalyzer::new();
    let channels = vec![ChannelSpec::named("technology")];

    for _ in 0..2 {
        let summary =
            ingest::run_once(&OverlappingWindow, &analyzer, &store, &channels, 50).await;
        assert_eq!(summary.rows_appended, 1);
    }

    let rows = store.rows_for_channel("technology").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], rows[1]);
}
