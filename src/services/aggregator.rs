use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{Entry, RetentionWindow};
use crate::sources::FeedSource;

/// A feed that could not be fetched or parsed during one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub message: String,
}

/// Outcome of one aggregation pass: the merged entries plus per-feed failures.
#[derive(Debug, Clone, Default)]
pub struct AggregationReport {
    /// Newest first.
    pub entries: Vec<Entry>,
    pub failures: Vec<FetchFailure>,
}

/// Fetches every configured feed, drops entries older than the retention
/// window and merges the rest newest-first.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn FeedSource>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    pub fn aggregate(
        &self,
        feeds: &[String],
        window: RetentionWindow,
        now: DateTime<Utc>,
    ) -> AggregationReport {
        let never = AtomicBool::new(false);
        self.aggregate_cancellable(feeds, window, now, &never)
            .unwrap_or_default()
    }

    /// Like [`aggregate`](Self::aggregate), but gives up between feeds once
    /// `cancelled` is set and returns `None`.
    pub fn aggregate_cancellable(
        &self,
        feeds: &[String],
        window: RetentionWindow,
        now: DateTime<Utc>,
        cancelled: &AtomicBool,
    ) -> Option<AggregationReport> {
        let mut report = AggregationReport::default();
        let mut dropped = 0usize;

        for url in feeds {
            if cancelled.load(Ordering::SeqCst) {
                return None;
            }

            let items = match self.source.fetch(url) {
                Ok(items) => items,
                Err(e) => {
                    // Log error but continue with other feeds
                    warn!(url = %url, error = %e, "failed to load feed");
                    report.failures.push(FetchFailure {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            for item in items {
                let entry = Entry::from_raw(item, url, now);
                if window.contains(entry.published_at) {
                    report.entries.push(entry);
                } else {
                    dropped += 1;
                }
            }
        }

        // Stable: equal timestamps keep discovery order.
        report
            .entries
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));

        info!(
            feeds = feeds.len(),
            kept = report.entries.len(),
            dropped,
            failed = report.failures.len(),
            "aggregation finished"
        );

        Some(report)
    }
}
