//! Output module for reporting crawl results
//!
//! No manifest is written next to the images; a later run relies only on
//! which filenames already exist.

pub mod stats;

pub use stats::{print_summary, CrawlSummary};
