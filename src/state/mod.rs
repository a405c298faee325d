//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the page queue, the visited set, and the page-count cap of one run
//! - `DownloadRecord`: the image URLs fetched so far, shared by all image workers

mod crawl_state;
mod download_record;

// Re-export main types
pub use crawl_state::CrawlState;
pub use download_record::{ClaimOutcome, DownloadClaim, DownloadRecord};
