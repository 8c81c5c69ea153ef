use crate::domain::RawItem;
use crate::errors::FeederResult;

/// Turns a feed location into parsed items.
///
/// Implementations are called from the refresh worker thread, one call per
/// configured feed; an error affects only that feed.
#[cfg_attr(test, mockall::automock)]
pub trait FeedSource: Send + Sync {
    fn fetch(&self, url: &str) -> FeederResult<Vec<RawItem>>;
}
