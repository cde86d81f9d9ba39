// src/ingest/aggregate.rs
// Combine per-channel batches into one ordered run batch.

use crate::model::ScoredPost;

/// Concatenate per-channel results in configured channel order, preserving
/// within-channel fetch order. Empty inputs contribute nothing; output length
/// is always the sum of the input lengths.
pub fn concat_batches(per_channel: Vec<Vec<ScoredPost>>) -> Vec<ScoredPost> {
    let total = per_channel.iter().map(Vec::len).sum();
    let mut batch = Vec::with_capacity(total);
    for mut channel_posts in per_channel {
        batch.append(&mut channel_posts);
    }
    batch
}
