// src/ingest/mod.rs
// One run of the pipeline: fetch -> normalize -> score per channel,
// aggregate once, persist once. Channels are processed strictly in the
// configured order, one at a time; a failing channel never takes the
// rest of the run down with it.

pub mod aggregate;
pub mod normalize;
pub mod providers;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::config::ChannelSpec;
use crate::ingest::providers::SourceClient;
use crate::model::ScoredPost;
use crate::sentiment::SentimentAnalyzer;
use crate::store::SentimentStore;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_posts_fetched_total",
            "Posts decoded from provider listings."
        );
        describe_counter!("ingest_posts_scored_total", "Posts scored and batched.");
        describe_counter!(
            "ingest_channels_skipped_total",
            "Channels skipped (fetch failure or empty result)."
        );
        describe_counter!("ingest_fetch_errors_total", "Provider fetch/decode errors.");
        describe_counter!(
            "ingest_persist_errors_total",
            "Failed batch writes to the store."
        );
        describe_histogram!("ingest_parse_ms", "Listing decode time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when a run last completed.");
    });
}

/// Outcome of one run, for the entrypoint to log and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub channels_total: usize,
    /// Channels that contributed nothing (fetch failure or legitimately empty).
    pub channels_skipped: usize,
    pub posts_scored: usize,
    /// Rows appended by the single persist attempt.
    pub rows_appended: u64,
    /// Set when the persist attempt failed; the run still ends normally,
    /// without retry and without touching rows from earlier runs.
    pub persist_error: Option<String>,
}

/// Execute one full run over `channels`, in order.
///
/// Per-channel failure isolation: a fetch error or an empty listing skips
/// that channel only. The store is written exactly once, after every channel
/// has been processed; a write failure is surfaced as a run-level warning in
/// the summary rather than an error.
pub async fn run_once(
    client: &dyn SourceClient,
    analyzer: &SentimentAnalyzer,
    store: &SentimentStore,
    channels: &[ChannelSpec],
    default_limit: u32,
) -> RunSummary {
    ensure_metrics_described();

    let mut per_channel: Vec<Vec<ScoredPost>> = Vec::with_capacity(channels.len());
    let mut skipped = 0usize;

    for channel in channels {
        let limit = channel.limit.unwrap_or(default_limit);
        let raw = match client.fetch_newest(&channel.name, limit).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    channel = %channel.name,
                    provider = client.name(),
                    "channel fetch failed"
                );
                counter!("ingest_fetch_errors_total").increment(1);
                counter!("ingest_channels_skipped_total").increment(1);
                skipped += 1;
                continue;
            }
        };
        if raw.is_empty() {
            tracing::debug!(channel = %channel.name, "no posts fetched");
            counter!("ingest_channels_skipped_total").increment(1);
            skipped += 1;
            continue;
        }

        let scored: Vec<ScoredPost> = raw
            .into_iter()
            .map(|post| analyzer.score_post(post))
            .collect();
        tracing::info!(channel = %channel.name, count = scored.len(), "channel scored");
        counter!("ingest_posts_scored_total").increment(scored.len() as u64);
        per_channel.push(scored);
    }

    let batch = aggregate::concat_batches(per_channel);
    let posts_scored = batch.len();

    let mut summary = RunSummary {
        channels_total: channels.len(),
        channels_skipped: skipped,
        posts_scored,
        rows_appended: 0,
        persist_error: None,
    };

    if batch.is_empty() {
        tracing::info!("no data fetched from any channel, nothing to store");
    } else {
        match store.append_batch(&batch).await {
            Ok(rows) => {
                tracing::info!(rows, channels = channels.len() - skipped, "batch stored");
                summary.rows_appended = rows;
            }
            Err(e) => {
                // Run-level warning: no retry, no rollback of prior runs.
                tracing::warn!(error = ?e, "storing batch failed");
                counter!("ingest_persist_errors_total").increment(1);
                summary.persist_error = Some(format!("{e:#}"));
            }
        }
    }

    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    summary
}
