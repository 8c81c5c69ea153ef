//! Recency-filtered feed reader.
//!
//! ```text
//! SettingsStore ──► RefreshScheduler ──► Aggregator ──► Session ──► export / EntryRepository
//!                    (worker thread)     (FeedSource)   (interactive thread)
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod scheduler;
pub mod services;
pub mod session;
pub mod sources;
pub mod storage;
