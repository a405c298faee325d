//! Crawl scheduler
//!
//! This module drives a whole crawl:
//! - Owning the FIFO page queue and the visited set
//! - Handing pages to the page processor one at a time
//! - Queueing newly discovered links in discovery order
//! - Stopping on an empty queue, the page-count cap, or cancellation

use crate::config::{validate, Config};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::images::ImageFetcher;
use crate::crawler::page::{PageProcessor, PageStatus};
use crate::output::CrawlSummary;
use crate::state::{CrawlState, DownloadRecord};
use crate::storage::ImageStore;
use crate::GatherError;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Drives breadth-first traversal of one site
///
/// Pages are processed strictly one after another; only the images of the
/// current page are downloaded concurrently.
pub struct Scheduler {
    state: CrawlState,
    processor: PageProcessor,
    record: Arc<DownloadRecord>,
    cancel: CancellationToken,
}

impl Scheduler {
    /// Creates a scheduler for a crawl starting at `seed`
    ///
    /// The image store's destination is created here; failing to create it is
    /// fatal because the crawl would have nowhere to put images.
    ///
    /// # Arguments
    ///
    /// * `seed` - The absolute URL the crawl starts from
    /// * `config` - The crawler configuration
    /// * `store` - Destination for downloaded images
    /// * `cancel` - Token that stops the crawl early when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to run
    /// * `Err(GatherError)` - The configuration is invalid, the seed has no
    ///   host, the destination could not be created, or the HTTP client could
    ///   not be built
    pub fn new(
        seed: &Url,
        config: &Config,
        store: Arc<dyn ImageStore>,
        cancel: CancellationToken,
    ) -> Result<Self, GatherError> {
        validate(config)?;
        let state = CrawlState::new(seed, config.crawler.max_pages)?;
        store.ensure_dir()?;

        let client = build_http_client(&config.http)?;
        let record = Arc::new(DownloadRecord::new());

        let images = ImageFetcher::new(
            client.clone(),
            store,
            Arc::clone(&record),
            config.http.image_timeout(),
            cancel.clone(),
        );
        let processor = PageProcessor::new(
            client,
            images,
            config.crawler.max_workers,
            config.http.page_timeout(),
            cancel.clone(),
        );

        Ok(Self {
            state,
            processor,
            record,
            cancel,
        })
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn record(&self) -> &DownloadRecord {
        &self.record
    }

    /// Runs the crawl loop until it terminates
    ///
    /// Every popped URL is either skipped (already visited) or processed, and
    /// each processed page grows the visited set, so the loop ends after at
    /// most `max-pages` pages. Individual page or image failures never end the
    /// run; the summary is always returned.
    pub async fn run(&mut self) -> CrawlSummary {
        let start_time = Instant::now();
        let mut summary = CrawlSummary::default();

        tracing::info!(
            "Starting crawl of {} (max {} pages)",
            self.state.seed_host(),
            self.state.page_count_cap()
        );

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled, stopping");
                summary.cancelled = true;
                break;
            }

            let url = match self.state.pop_next() {
                Some(url) => url,
                None => {
                    if self.state.cap_reached() {
                        tracing::info!(
                            "Page limit of {} reached, {} pages left in queue",
                            self.state.page_count_cap(),
                            self.state.queue_len()
                        );
                    } else {
                        tracing::info!("Queue is empty, crawl complete");
                    }
                    break;
                }
            };

            if self.state.is_visited(url.as_str()) {
                continue;
            }

            tracing::debug!("Processing page: {}", url);
            let result = self.processor.process_page(&url, &mut self.state).await;

            match result.status {
                PageStatus::Failed => summary.pages_failed += 1,
                PageStatus::Cancelled => summary.cancelled = true,
                PageStatus::Fetched | PageStatus::Skipped | PageStatus::OffSite => {}
            }
            summary.images.merge(&result.images);

            let mut queued = 0;
            for link in result.links {
                if self.state.enqueue(link) {
                    queued += 1;
                }
            }
            tracing::debug!("{}: queued {} new pages", url, queued);

            let pages_crawled = self.state.visited_count();
            if pages_crawled % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = pages_crawled as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} pages crawled, {} in queue, {} images saved, {:.2} pages/sec",
                    pages_crawled,
                    self.state.queue_len(),
                    self.record.len(),
                    rate
                );
            }
        }

        summary.pages_visited = self.state.visited_count();
        summary.images_downloaded = self.record.len();
        summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl finished: {} pages visited, {} images downloaded in {:?}",
            summary.pages_visited,
            summary.images_downloaded,
            summary.elapsed
        );

        summary
    }
}
