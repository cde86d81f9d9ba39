//! # Read Contract
//! What the dashboard consumes: per-channel trend points in the viewer's
//! local time zone with a trailing rolling mean (window 5, min-period 1),
//! plus the top posts by engagement. Decoupled from the ingestion core; the
//! view only ever reads the store, through a TTL cache with manual
//! invalidation.

use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::model::{ScoredPost, SentimentLabel};
use crate::rolling::RollingMean;

pub const ROLLING_WINDOW: usize = 5;
pub const TOP_POSTS: usize = 10;

/// One plotted point: local-time instant, raw score, trailing mean.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub created_local: DateTime<Local>,
    pub sentiment_score: f64,
    pub rolling_mean: f64,
    pub sentiment_label: SentimentLabel,
}

/// Read-side projection of one channel's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelView {
    pub channel: String,
    /// Ordered by local time, oldest first.
    pub points: Vec<TrendPoint>,
    /// Top rows by engagement score, highest first, at most [`TOP_POSTS`].
    pub top_posts: Vec<ScoredPost>,
}

/// Build the view from one channel's rows (any order; sorted here).
pub fn build_channel_view(channel: &str, mut rows: Vec<ScoredPost>) -> ChannelView {
    rows.sort_by_key(|p| p.created_utc);

    let mut rm = RollingMean::new(ROLLING_WINDOW);
    let points = rows
        .iter()
        .map(|p| TrendPoint {
            created_local: p.created_utc.with_timezone(&Local),
            sentiment_score: p.sentiment_score,
            rolling_mean: rm.push(p.sentiment_score),
            sentiment_label: p.sentiment_label,
        })
        .collect();

    let mut top_posts = rows;
    top_posts.sort_by(|a, b| b.score.cmp(&a.score));
    top_posts.truncate(TOP_POSTS);

    ChannelView {
        channel: channel.to_string(),
        points,
        top_posts,
    }
}

/// Read-through cache over the store rows. Entries live for `ttl`; a manual
/// `invalidate()` drops the entry immediately (the dashboard's refresh
/// button). The ingestion core never touches this.
#[derive(Debug)]
pub struct ReadCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(Instant, Arc<T>)>>,
}

impl<T> ReadCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if fresh, otherwise load, cache, and return.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        {
            let slot = self.slot.lock().expect("read cache mutex poisoned");
            if let Some((stamp, value)) = slot.as_ref() {
                if stamp.elapsed() < self.ttl {
                    return Ok(Arc::clone(value));
                }
            }
        }
        // Lock released while loading; a racing load just overwrites.
        let value = Arc::new(load().await?);
        let mut slot = self.slot.lock().expect("read cache mutex poisoned");
        *slot = Some((Instant::now(), Arc::clone(&value)));
        Ok(value)
    }

    /// Drop any cached entry; the next read loads fresh.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().expect("read cache mutex poisoned");
        *slot = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawPost;
    use chrono::{TimeZone, Utc};

    fn post(id: &str, ts: i64, engagement: i64, polarity: f64) -> ScoredPost {
        ScoredPost::from_raw(
            RawPost {
                id: id.into(),
                title: "t".into(),
                selftext: String::new(),
                created_utc: Utc.timestamp_opt(ts, 0).unwrap(),
                channel: "technology".into(),
                score: engagement,
            },
            polarity,
        )
    }

    #[test]
    fn points_are_time_ordered_with_rolling_mean() {
        // Insert out of order; the view sorts by time.
        let rows = vec![
            post("b", 200, 5, 0.0),
            post("a", 100, 9, 1.0),
            post("c", 300, 1, 0.5),
        ];
        let view = build_channel_view("technology", rows);
        let ids_by_time: Vec<f64> = view.points.iter().map(|p| p.sentiment_score).collect();
        assert_eq!(ids_by_time, vec![1.0, 0.0, 0.5]);
        assert_eq!(view.points[0].rolling_mean, 1.0);
        assert_eq!(view.points[1].rolling_mean, 0.5);
        assert_eq!(view.points[2].rolling_mean, 0.5);
    }

    #[test]
    fn top_posts_ranked_by_engagement_capped_at_ten() {
        let rows: Vec<ScoredPost> = (0..15)
            .map(|i| post(&format!("p{i}"), i, i, 0.0))
            .collect();
        let view = build_channel_view("technology", rows);
        assert_eq!(view.top_posts.len(), TOP_POSTS);
        assert_eq!(view.top_posts[0].score, 14);
        assert!(view
            .top_posts
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn cache_serves_fresh_and_honors_invalidate() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let loads = AtomicUsize::new(0);
        let cache: ReadCache<u32> = ReadCache::new(Duration::from_secs(60));

        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, std::convert::Infallible>(7)
        };

        assert_eq!(*cache.get_or_load(load).await.unwrap(), 7);
        let load2 = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, std::convert::Infallible>(8)
        };
        // Still fresh: second read must not hit the loader.
        assert_eq!(*cache.get_or_load(load2).await.unwrap(), 7);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate();
        let load3 = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, std::convert::Infallible>(9)
        };
        assert_eq!(*cache.get_or_load(load3).await.unwrap(), 9);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cache_expires_after_ttl() {
        let cache: ReadCache<u32> = ReadCache::new(Duration::from_millis(10));
        let v = cache
            .get_or_load(|| async { Ok::<u32, std::convert::Infallible>(1) })
            .await
            .unwrap();
        assert_eq!(*v, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let v = cache
            .get_or_load(|| async { Ok::<u32, std::convert::Infallible>(2) })
            .await
            .unwrap();
        assert_eq!(*v, 2);
    }
}
