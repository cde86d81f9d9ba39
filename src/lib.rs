// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod ingest;
pub mod model;
pub mod rolling;
pub mod sentiment;
pub mod store;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, ChannelSpec};
pub use crate::ingest::providers::{reddit::RedditClient, SourceClient};
pub use crate::ingest::{run_once, RunSummary};
pub use crate::model::{RawPost, ScoredPost, SentimentLabel};
pub use crate::sentiment::SentimentAnalyzer;
pub use crate::store::SentimentStore;
