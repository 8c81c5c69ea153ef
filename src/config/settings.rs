//! User-editable settings persisted as a flat JSON record.
//!
//! The file is read once at startup. A missing file is replaced by the
//! defaults (and written back); a file that exists but does not parse is
//! reported as [`FeederError::SettingsParse`] and left untouched. Parsed
//! values go through the same checks as user edits; a violation is
//! [`FeederError::SettingsInvalid`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{FeederError, FeederResult};

pub const DEFAULT_FEED: &str = "http://feeds.bbci.co.uk/news/rss.xml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub feeds: Vec<String>,
    pub days: u32,
    pub font_size: u32,
    pub dark_mode: bool,
    /// Minutes between scheduled refreshes.
    pub refresh_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: vec![DEFAULT_FEED.to_string()],
            days: 7,
            font_size: 12,
            dark_mode: false,
            refresh_interval: 30,
        }
    }
}

impl Settings {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_interval) * 60)
    }
}

/// Raw, unvalidated values as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDraft {
    pub feeds: Vec<String>,
    pub days: String,
    pub font_size: String,
    pub refresh_interval: String,
    pub dark_mode: bool,
}

impl SettingsDraft {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            feeds: settings.feeds.clone(),
            days: settings.days.to_string(),
            font_size: settings.font_size.to_string(),
            refresh_interval: settings.refresh_interval.to_string(),
            dark_mode: settings.dark_mode,
        }
    }

    pub fn validate(&self) -> FeederResult<Settings> {
        let feeds = self
            .feeds
            .iter()
            .filter(|url| !url.trim().is_empty())
            .cloned()
            .collect();

        Ok(Settings {
            feeds,
            days: parse_positive("Days", &self.days)?,
            font_size: parse_positive("Font size", &self.font_size)?,
            dark_mode: self.dark_mode,
            refresh_interval: parse_positive("Refresh interval", &self.refresh_interval)?,
        })
    }
}

fn parse_positive(field: &str, raw: &str) -> FeederResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(FeederError::InvalidInput(format!(
            "{} must be a whole number greater than zero, got '{}'",
            field, raw
        ))),
    }
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> FeederResult<Settings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let defaults = Settings::default();
                self.save(&defaults)?;
                info!(path = %self.path.display(), "created default settings");
                return Ok(defaults);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: Settings =
            serde_json::from_str(&content).map_err(|source| FeederError::SettingsParse {
                path: self.path.clone(),
                source,
            })?;

        SettingsDraft::from_settings(&stored)
            .validate()
            .map_err(|e| match e {
                FeederError::InvalidInput(message) => FeederError::SettingsInvalid {
                    path: self.path.clone(),
                    message,
                },
                other => other,
            })
    }

    /// Replace the settings file as a whole: write a sibling temp file, then rename over.
    pub fn save(&self, settings: &Settings) -> FeederResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| FeederError::Config(e.to_string()))?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Validate `draft`, persist it and only then replace `current`.
    pub fn apply(&self, current: &mut Settings, draft: &SettingsDraft) -> FeederResult<()> {
        let updated = draft.validate()?;
        self.save(&updated)?;
        info!(feeds = updated.feeds.len(), days = updated.days, "settings saved");
        *current = updated;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
