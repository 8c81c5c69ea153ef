pub mod settings;

pub use settings::{Settings, SettingsDraft, SettingsStore};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{FeederError, FeederResult};

const DEFAULT_SETTINGS_FILE: &str = "rss_settings.json";
const DEFAULT_DB_FILE: &str = "rss_entries.db";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub settings_path: PathBuf,
    pub db_path: PathBuf,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> FeederResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let settings_path = std::env::var("FEEDSHELF_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::beside_exe(exe_dir.as_deref(), DEFAULT_SETTINGS_FILE));

        let db_path = std::env::var("FEEDSHELF_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::beside_exe(exe_dir.as_deref(), DEFAULT_DB_FILE));

        let fetch_timeout = match std::env::var("FEEDSHELF_FETCH_TIMEOUT_SECS") {
            Ok(raw) => Self::parse_timeout(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        Ok(Self {
            settings_path,
            db_path,
            fetch_timeout,
        })
    }

    fn beside_exe(exe_dir: Option<&Path>, file_name: &str) -> PathBuf {
        exe_dir
            .map(|d| d.join(file_name))
            .unwrap_or_else(|| PathBuf::from(".").join(file_name))
    }

    fn parse_timeout(raw: &str) -> FeederResult<Duration> {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(FeederError::Config(format!(
                "FEEDSHELF_FETCH_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                raw
            ))),
        }
    }
}
