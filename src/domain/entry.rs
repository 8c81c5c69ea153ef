use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Timestamp layout written to the saved-entries table.
pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Timestamp layout shown in the list and in Markdown exports.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const FIELD_SEPARATOR: &[u8] = b"\x1f";

/// One item as handed back by a feed source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

impl RawItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub source_feed: String,
}

impl Entry {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
        source_feed: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at,
            source_feed: source_feed.into(),
        }
    }

    /// Build an entry from a raw item; undated items take `now`.
    pub fn from_raw(item: RawItem, source_feed: &str, now: DateTime<Utc>) -> Self {
        Self {
            title: item.title.unwrap_or_else(|| "Untitled".to_string()),
            link: item.link.unwrap_or_default(),
            published_at: item.published.unwrap_or(now),
            source_feed: source_feed.to_string(),
        }
    }

    pub fn published_for_store(&self) -> String {
        self.published_at.format(STORE_TIMESTAMP_FORMAT).to_string()
    }

    pub fn published_for_display(&self) -> String {
        self.published_at.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
    }

    /// "{YYYY-MM-DD HH:MM} - {title}"
    pub fn display_line(&self) -> String {
        format!("{} - {}", self.published_for_display(), self.title)
    }
}

/// Stable identifier for a row in the current entry list.
///
/// Structurally identical entries are told apart by `ordinal`, their
/// occurrence number among identical rows in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate(entry: &Entry, ordinal: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(entry.title.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(entry.link.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(entry.published_for_store().as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(entry.source_feed.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(ordinal.to_be_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Entry {
        Entry::new(
            "Announcing Rust 1.75.0",
            "https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html",
            Utc.with_ymd_and_hms(2023, 12, 28, 9, 5, 7).unwrap(),
            "https://blog.rust-lang.org/feed.xml",
        )
    }

    #[test]
    fn test_timestamp_formats() {
        let entry = sample();
        assert_eq!(entry.published_for_store(), "2023-12-28 09:05:07");
        assert_eq!(entry.published_for_display(), "2023-12-28 09:05");
        assert_eq!(entry.display_line(), "2023-12-28 09:05 - Announcing Rust 1.75.0");
    }

    #[test]
    fn test_from_raw_defaults_missing_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let entry = Entry::from_raw(RawItem::default(), "feedA", now);

        assert_eq!(entry.title, "Untitled");
        assert_eq!(entry.link, "");
        assert_eq!(entry.published_at, now);
        assert_eq!(entry.source_feed, "feedA");
    }

    #[test]
    fn test_from_raw_keeps_published_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let published = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let item = RawItem::new("t").with_link("l").with_published(Some(published));

        let entry = Entry::from_raw(item, "feedA", now);
        assert_eq!(entry.published_at, published);
        assert_eq!(entry.link, "l");
    }

    #[test]
    fn test_id_deterministic_and_ordinal_sensitive() {
        let entry = sample();
        assert_eq!(EntryId::generate(&entry, 0), EntryId::generate(&entry, 0));
        assert_ne!(EntryId::generate(&entry, 0), EntryId::generate(&entry, 1));

        let mut other_feed = entry.clone();
        other_feed.source_feed = "https://mirror.example/feed.xml".into();
        assert_ne!(EntryId::generate(&entry, 0), EntryId::generate(&other_feed, 0));
    }

    #[test]
    fn test_id_is_hex_sha256() {
        let id = EntryId::generate(&sample(), 0);
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
