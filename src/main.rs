//! Binary entrypoint: one pipeline run, then exit.
//!
//! Periodic execution is the external scheduler's job (cron, systemd timer);
//! each invocation performs exactly one fetch → score → persist run.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reddit_sentiment_tracker::{
    config::AppConfig, ingest, sentiment::SentimentAnalyzer, store::SentimentStore, RedditClient,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reddit_sentiment_tracker=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = AppConfig::load_default()?;
    tracing::info!(
        channels = cfg.channels.len(),
        limit = cfg.fetch.limit,
        "starting run"
    );

    let client = RedditClient::from_config(&cfg.fetch)?;
    let analyzer = SentimentAnalyzer::new();
    let store = SentimentStore::connect(&cfg.database_url).await?;

    let summary = ingest::run_once(
        &client,
        &analyzer,
        &store,
        &cfg.channels,
        cfg.fetch.limit,
    )
    .await;

    match &summary.persist_error {
        Some(err) => tracing::warn!(
            posts = summary.posts_scored,
            skipped = summary.channels_skipped,
            error = %err,
            "run finished, batch was not stored"
        ),
        None => tracing::info!(
            posts = summary.posts_scored,
            rows = summary.rows_appended,
            skipped = summary.channels_skipped,
            of = summary.channels_total,
            "run finished"
        ),
    }

    Ok(())
}
