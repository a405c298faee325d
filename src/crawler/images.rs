//! Image fetcher
//!
//! Downloads one image URL into the image store, skipping URLs already
//! downloaded in this run and filenames already present in the store.

use crate::crawler::fetcher::{classify_error, send_get};
use crate::state::{ClaimOutcome, DownloadRecord};
use crate::storage::ImageStore;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Extensions kept as-is when deriving a filename; anything else gets `.jpg`
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg"];

/// What happened to one image URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes were fetched and written
    Saved,

    /// Already downloaded (or being downloaded) earlier in this run
    SkippedDuplicate,

    /// The destination filename already exists in the store
    SkippedExists,

    /// Transport error, HTTP error status, or write failure
    Failed(String),

    /// The crawl was cancelled before the fetch finished
    Cancelled,
}

/// Derives the destination filename for an image URL
///
/// The last path segment is used as-is. When the path has no final segment
/// (`/foo/`, `/`), `image_<n>.jpg` is synthesized from the run's counter.
/// Names without a known image extension get `.jpg` appended; this only
/// affects naming, the bytes are stored verbatim.
///
/// # Examples
///
/// ```
/// use sumi_gather::crawler::derive_filename;
/// use sumi_gather::state::DownloadRecord;
/// use url::Url;
///
/// let record = DownloadRecord::new();
/// let url = Url::parse("http://example.com/img/cat.PNG").unwrap();
/// assert_eq!(derive_filename(&url, &record), "cat.PNG");
///
/// let url = Url::parse("http://example.com/foo/").unwrap();
/// assert_eq!(derive_filename(&url, &record), "image_1.jpg");
/// ```
pub fn derive_filename(url: &Url, record: &DownloadRecord) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty());

    let name = match segment {
        Some(segment) => segment.to_string(),
        None => format!("image_{}.jpg", record.next_unnamed_index()),
    };

    if has_image_extension(&name) {
        name
    } else {
        format!("{}.jpg", name)
    }
}

fn has_image_extension(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| name.strip_suffix(known).is_some_and(|stem| stem.ends_with('.')))
}

/// Downloads images into a store, sharing one download record
///
/// Cloning is cheap; each image worker gets its own clone.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
    store: Arc<dyn ImageStore>,
    record: Arc<DownloadRecord>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl ImageFetcher {
    pub fn new(
        client: Client,
        store: Arc<dyn ImageStore>,
        record: Arc<DownloadRecord>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            store,
            record,
            timeout,
            cancel,
        }
    }

    pub fn record(&self) -> &Arc<DownloadRecord> {
        &self.record
    }

    /// Downloads one image
    ///
    /// # Flow
    ///
    /// 1. Under the record's lock: skip if the URL was already downloaded or
    ///    is in flight, derive the filename, skip if it exists in the store,
    ///    otherwise mark the URL in flight
    /// 2. Stream the body into the store with the image timeout, publishing
    ///    it under the derived filename only once complete
    /// 3. Record the URL as downloaded
    ///
    /// No failure here is fatal to the page or the crawl; it is logged and
    /// returned as `Failed`.
    pub async fn fetch_image(&self, url: &Url) -> DownloadOutcome {
        let mut filename = String::new();
        let claim = match self.record.try_claim(url.as_str(), || {
            filename = derive_filename(url, &self.record);
            self.store.exists(&filename)
        }) {
            ClaimOutcome::Duplicate => {
                tracing::debug!("Skipping {}: already downloaded", url);
                return DownloadOutcome::SkippedDuplicate;
            }
            ClaimOutcome::Exists => {
                tracing::debug!(
                    "Skipping {}: {} already exists",
                    url,
                    self.store.location(&filename).display()
                );
                return DownloadOutcome::SkippedExists;
            }
            ClaimOutcome::Acquired(claim) => claim,
        };

        let saved = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Download of {} cancelled", url);
                return DownloadOutcome::Cancelled;
            }
            saved = self.stream_to_store(url, &filename) => saved,
        };

        match saved {
            Ok(bytes) => {
                claim.complete();
                tracing::info!(
                    "Saved {} ({} bytes) -> {}",
                    url,
                    bytes,
                    self.store.location(&filename).display()
                );
                DownloadOutcome::Saved
            }
            Err(reason) => {
                tracing::warn!("Failed to download image {}: {}", url, reason);
                DownloadOutcome::Failed(reason)
            }
        }
    }

    /// Streams the image body into the store chunk by chunk
    ///
    /// The writer is only committed once the whole body has arrived; on any
    /// failure (or if this future is dropped) it is discarded.
    async fn stream_to_store(&self, url: &Url, filename: &str) -> Result<u64, String> {
        let mut response = send_get(&self.client, url, self.timeout)
            .await
            .map_err(|failure| {
                failure
                    .failure_reason()
                    .unwrap_or_else(|| "unknown error".to_string())
            })?;

        let mut writer = self
            .store
            .create(filename)
            .await
            .map_err(|e| e.to_string())?;

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => writer
                    .write_chunk(&chunk)
                    .await
                    .map_err(|e| e.to_string())?,
                Ok(None) => break,
                Err(e) => {
                    return Err(classify_error(&e)
                        .failure_reason()
                        .unwrap_or_else(|| e.to_string()))
                }
            }
        }

        writer.commit().await.map_err(|e| e.to_string())
    }
}
