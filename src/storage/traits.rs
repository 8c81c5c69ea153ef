use crate::errors::FeederResult;

/// Append-only shelf of entries the user chose to keep.
#[cfg_attr(test, mockall::automock)]
pub trait EntryRepository: Send + Sync {
    /// `published` must already be in `YYYY-MM-DD HH:MM:SS` form; it is stored verbatim.
    fn append(&self, title: &str, link: &str, published: &str) -> FeederResult<i64>;
}
