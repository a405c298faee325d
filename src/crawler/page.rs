//! Page processor
//!
//! Handles one page: fetch it, download its images through a bounded worker
//! pool, and return the same-host links it points to.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::images::{DownloadOutcome, ImageFetcher};
use crate::crawler::parser::parse_html;
use crate::state::CrawlState;
use crate::url::{extract_host, is_crawlable};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Per-page counts of image outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageTally {
    pub saved: usize,
    pub duplicate: usize,
    pub exists: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl ImageTally {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved => self.saved += 1,
            DownloadOutcome::SkippedDuplicate => self.duplicate += 1,
            DownloadOutcome::SkippedExists => self.exists += 1,
            DownloadOutcome::Failed(_) => self.failed += 1,
            DownloadOutcome::Cancelled => self.cancelled += 1,
        }
    }

    pub fn merge(&mut self, other: &ImageTally) {
        self.saved += other.saved;
        self.duplicate += other.duplicate;
        self.exists += other.exists;
        self.failed += other.failed;
        self.cancelled += other.cancelled;
    }

    /// Number of images that reached a final outcome
    pub fn total(&self) -> usize {
        self.saved + self.duplicate + self.exists + self.failed + self.cancelled
    }
}

/// How far processing of one page got
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageStatus {
    /// Already visited or over the page cap; nothing was done
    #[default]
    Skipped,

    /// Fetched and parsed; its images were downloaded
    Fetched,

    /// Transport error or HTTP error status
    Failed,

    /// A redirect led off the seed's host; the page was not parsed
    OffSite,

    /// The crawl was cancelled while the page was being fetched
    Cancelled,
}

/// What processing one page produced
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    /// Same-host links not yet visited, in discovery order
    pub links: Vec<Url>,

    /// Outcomes of this page's image downloads
    pub images: ImageTally,

    pub status: PageStatus,
}

impl PageResult {
    fn empty(status: PageStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// Processes pages one at a time, fanning out image downloads
pub struct PageProcessor {
    client: Client,
    images: ImageFetcher,
    max_workers: usize,
    page_timeout: Duration,
    cancel: CancellationToken,
}

impl PageProcessor {
    pub fn new(
        client: Client,
        images: ImageFetcher,
        max_workers: usize,
        page_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            images,
            max_workers: max_workers.max(1),
            page_timeout,
            cancel,
        }
    }

    /// Processes one page
    ///
    /// # Flow
    ///
    /// 1. Return an empty result if the page is already visited or the
    ///    page-count cap is reached
    /// 2. Mark the page visited before fetching it
    /// 3. Fetch the page; on failure log and return an empty result
    /// 4. If redirects ended on another host, stop; otherwise resolve the
    ///    page's links and images against the URL it was served from
    /// 5. Download every image on the page through at most `max_workers`
    ///    concurrent workers, waiting for all of them to finish
    /// 6. Return the page's links that pass `is_crawlable` against the
    ///    updated state
    pub async fn process_page(&self, page_url: &Url, state: &mut CrawlState) -> PageResult {
        if state.is_visited(page_url.as_str()) || state.cap_reached() {
            return PageResult::default();
        }

        state.mark_visited(page_url.as_str());

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Fetch of {} cancelled", page_url);
                return PageResult::empty(PageStatus::Cancelled);
            }
            fetched = fetch_url(&self.client, page_url, self.page_timeout) => fetched,
        };

        let (final_url, html) = match fetched {
            FetchResult::Success { final_url, body } => {
                (final_url, String::from_utf8_lossy(&body).into_owned())
            }
            other => {
                let reason = other
                    .failure_reason()
                    .unwrap_or_else(|| "unknown error".to_string());
                tracing::warn!("Failed to fetch page {}: {}", page_url, reason);
                return PageResult::empty(PageStatus::Failed);
            }
        };

        if extract_host(&final_url).as_deref() != Some(state.seed_host()) {
            tracing::info!("{} redirected off-site to {}, skipping", page_url, final_url);
            return PageResult::empty(PageStatus::OffSite);
        }

        let parsed = parse_html(&html, &final_url);
        tracing::debug!(
            "{}: {} images, {} links",
            page_url,
            parsed.images.len(),
            parsed.links.len()
        );

        let images = self.download_images(parsed.images).await;

        let state: &CrawlState = state;
        let links = parsed
            .links
            .into_iter()
            .filter(|link| is_crawlable(link.as_str(), state))
            .collect();

        PageResult {
            links,
            images,
            status: PageStatus::Fetched,
        }
    }

    /// Downloads a page's images and waits for every one of them
    ///
    /// A worker slot is taken before each task is spawned, so at most
    /// `max_workers` downloads run at once and the remaining images wait their
    /// turn here.
    async fn download_images(&self, images: Vec<Url>) -> ImageTally {
        let mut tally = ImageTally::default();
        if images.is_empty() {
            return tally;
        }

        let slots = Arc::new(Semaphore::new(self.max_workers));
        let mut workers = JoinSet::new();

        for image in images {
            if self.cancel.is_cancelled() {
                break;
            }

            let permit = match Arc::clone(&slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let fetcher = self.images.clone();
            workers.spawn(async move {
                let _permit = permit;
                fetcher.fetch_image(&image).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => tally.record(&outcome),
                Err(e) => {
                    tracing::warn!("Image worker did not finish: {}", e);
                    tally.failed += 1;
                }
            }
        }

        tally
    }
}
