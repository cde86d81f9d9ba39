// src/ingest/providers/mod.rs
pub mod reddit;

use anyhow::Result;

use crate::model::RawPost;

/// A source of posts for one named channel.
///
/// Implementations should recover from their own transport problems where
/// possible; the orchestrator treats an `Err` as "skip this channel" and
/// carries on with the rest of the run either way.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch up to `limit` newest posts for `channel`, already normalized.
    async fn fetch_newest(&self, channel: &str, limit: u32) -> Result<Vec<RawPost>>;

    fn name(&self) -> &'static str;
}
