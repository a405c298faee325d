//! Crawler module for page traversal and image download
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-request timeouts
//! - HTML parsing for links and images
//! - The image fetcher and its bounded worker pool
//! - Breadth-first scheduling of pages

mod fetcher;
mod images;
mod page;
mod parser;
mod scheduler;

pub use fetcher::{build_http_client, fetch_url, send_get, FetchResult};
pub use images::{derive_filename, DownloadOutcome, ImageFetcher, IMAGE_EXTENSIONS};
pub use page::{ImageTally, PageProcessor, PageResult, PageStatus};
pub use parser::{parse_html, ParsedPage};
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::storage::FsImageStore;
use crate::GatherError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs a complete crawl, saving images into the configured output folder
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the output folder
/// 2. Build the HTTP client
/// 3. Visit pages breadth-first from `seed`, staying on the seed's host
/// 4. Download every image found on each visited page
/// 5. Return the crawl summary
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - The crawler configuration
/// * `cancel` - Token that stops the crawl early when cancelled
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl ran to completion (or was cancelled)
/// * `Err(GatherError)` - Crawl could not start
///
/// # Example
///
/// ```no_run
/// use sumi_gather::config::{parse_seed_url, Config};
/// use sumi_gather::crawler::crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = parse_seed_url("https://example.com/")?;
/// let summary = crawl(&seed, &Config::default(), CancellationToken::new()).await?;
/// println!("{} images", summary.images_downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed: &Url,
    config: &Config,
    cancel: CancellationToken,
) -> Result<CrawlSummary, GatherError> {
    let store = Arc::new(FsImageStore::new(&config.output.folder));
    tracing::info!("Saving images to {}", store.root().display());
    let mut scheduler = Scheduler::new(seed, config, store, cancel)?;
    Ok(scheduler.run().await)
}
