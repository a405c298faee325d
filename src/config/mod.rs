//! Configuration module for Sumi-Gather
//!
//! Settings come from an optional TOML file; every key has a default so an
//! empty file (or no file at all) yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use sumi_gather::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gather.toml")).unwrap();
//! println!("Will visit at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config, parse_seed_url};
pub use validation::validate;
