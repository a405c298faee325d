//! Sumi-Gather: a same-site image harvester
//!
//! This crate walks a website breadth-first from a seed URL, stays on the
//! seed's host, and downloads every image referenced by the pages it visits.
//! Images are deduplicated by URL within a run and by destination filename
//! across runs.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Gather operations
///
/// Only startup problems surface through this type. Failures of a single page
/// or a single image are logged and folded into the crawl summary instead.
#[derive(Debug, Error)]
pub enum GatherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Unsupported URL scheme '{0}', expected http or https")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Gather operations
pub type Result<T> = std::result::Result<T, GatherError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, DownloadOutcome, Scheduler};
pub use output::CrawlSummary;
pub use state::{CrawlState, DownloadRecord};
pub use crate::url::{extract_host, is_crawlable};
