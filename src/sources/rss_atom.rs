use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use feed_rs::parser;
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::domain::RawItem;
use crate::errors::{FeederError, FeederResult};
use crate::sources::traits::FeedSource;

/// Fetches RSS 0.9x/1.0/2.0, Atom and JSON Feed documents over HTTP(S),
/// or from disk for `file://` URLs and plain paths.
pub struct RssAtomSource {
    client: Client,
}

impl RssAtomSource {
    /// `timeout` bounds each request from connect to the last body byte.
    pub fn new(timeout: Duration) -> FeederResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn read_feed(&self, url: &str) -> FeederResult<Vec<u8>> {
        if let Some(path) = Self::local_path(url)? {
            debug!(path = %path.display(), "reading local feed");
            return Ok(fs::read(path)?);
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Self::request_error(url, e))?
            .error_for_status()?;
        let bytes = response.bytes().map_err(|e| Self::request_error(url, e))?;

        Ok(bytes.to_vec())
    }

    /// `Some(path)` when `url` names a file rather than a remote resource.
    fn local_path(url: &str) -> FeederResult<Option<PathBuf>> {
        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "file" => parsed
                .to_file_path()
                .map(Some)
                .map_err(|_| FeederError::InvalidUrl(url.to_string())),
            Ok(_) => Ok(None),
            Err(e) => {
                let path = Path::new(url);
                if path.exists() {
                    Ok(Some(path.to_path_buf()))
                } else {
                    Err(FeederError::InvalidUrl(format!("{}: {}", url, e)))
                }
            }
        }
    }

    fn request_error(url: &str, err: reqwest::Error) -> FeederError {
        if err.is_timeout() {
            FeederError::FetchTimeout(url.to_string())
        } else {
            FeederError::Http(err)
        }
    }

    fn items_from_bytes(bytes: &[u8]) -> FeederResult<Vec<RawItem>> {
        let parsed = parser::parse(bytes).map_err(|e| FeederError::FeedParse(e.to_string()))?;

        let items = parsed
            .entries
            .into_iter()
            .map(|entry| RawItem {
                title: entry.title.map(|t| t.content),
                link: entry.links.into_iter().next().map(|l| l.href),
                published: entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.with_timezone(&Utc)),
            })
            .collect();

        Ok(items)
    }
}

impl FeedSource for RssAtomSource {
    fn fetch(&self, url: &str) -> FeederResult<Vec<RawItem>> {
        let bytes = self.read_feed(url)?;
        Self::items_from_bytes(&bytes)
    }
}
