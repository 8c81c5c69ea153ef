use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeederError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings file {path} is malformed: {source}")]
    SettingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Settings file {path} is invalid: {message}")]
    SettingsInvalid { path: PathBuf, message: String },

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Feed errors
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out fetching feed: {0}")]
    FetchTimeout(String),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to export entries to {path}: {source}")]
    Export {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Entry not found: {0}")]
    EntryNotFound(String),
}

pub type FeederResult<T> = Result<T, FeederError>;
