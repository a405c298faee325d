//! End-of-run crawl statistics
//!
//! The summary is always produced, even when every fetch failed or the crawl
//! was cancelled part way.

use crate::crawler::ImageTally;
use std::time::Duration;

/// Counts reported when a crawl finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Distinct pages taken from the queue and processed
    pub pages_visited: usize,

    /// Visited pages that could not be fetched
    pub pages_failed: usize,

    /// Distinct image URLs downloaded in this run
    pub images_downloaded: usize,

    /// Image outcomes summed over all pages
    pub images: ImageTally,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,

    /// True if the crawl stopped because it was cancelled
    pub cancelled: bool,
}

impl CrawlSummary {
    /// Images skipped because they were already downloaded or already on disk
    pub fn images_skipped(&self) -> usize {
        self.images.duplicate + self.images.exists
    }

    pub fn images_failed(&self) -> usize {
        self.images.failed
    }
}

/// Prints the summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    if summary.cancelled {
        println!("Crawl was cancelled before the queue drained.\n");
    }

    println!("Pages:");
    println!("  Visited: {}", summary.pages_visited);
    println!("  Failed: {}", summary.pages_failed);
    println!();

    println!("Images:");
    println!("  Downloaded: {}", summary.images_downloaded);
    println!(
        "  Skipped: {} ({} duplicate, {} already on disk)",
        summary.images_skipped(),
        summary.images.duplicate,
        summary.images.exists
    );
    println!("  Failed: {}", summary.images_failed());
    println!();

    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.pages_visited as f64 / secs
    } else {
        0.0
    };
    println!("Elapsed: {:.1}s ({:.2} pages/sec)", secs, rate);
}
