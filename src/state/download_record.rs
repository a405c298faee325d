//! Shared record of image downloads
//!
//! Every image worker of a run holds the same `Arc<DownloadRecord>`. The
//! membership check, the on-disk existence check, and the in-flight mark happen
//! in one critical section, so two workers racing on the same URL never both
//! fetch it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct RecordInner {
    /// Image URLs fetched and saved successfully in this run
    downloaded: HashSet<String>,

    /// Image URLs some worker is fetching right now
    in_flight: HashSet<String>,
}

/// Result of trying to claim an image URL for download
#[derive(Debug)]
pub enum ClaimOutcome {
    /// The URL was saved earlier in this run or is being fetched by another worker
    Duplicate,

    /// The destination file is already on disk
    Exists,

    /// The caller owns the download and must complete or drop the claim
    Acquired(DownloadClaim),
}

/// Run-scoped download bookkeeping shared across image workers
#[derive(Debug)]
pub struct DownloadRecord {
    inner: Mutex<RecordInner>,

    /// Counter for synthesized `image_<n>` filenames
    unnamed: AtomicUsize,
}

impl Default for DownloadRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadRecord {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RecordInner::default()),
            unnamed: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecordInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically tests an image URL and, if it is free, marks it in flight
    ///
    /// `destination_exists` is evaluated inside the critical section and only
    /// when the URL is neither downloaded nor in flight. A file found on disk
    /// does not add the URL to the record, since that file may have come from
    /// a different URL.
    pub fn try_claim(
        self: &Arc<Self>,
        url: &str,
        destination_exists: impl FnOnce() -> bool,
    ) -> ClaimOutcome {
        let mut inner = self.lock();

        if inner.downloaded.contains(url) || inner.in_flight.contains(url) {
            return ClaimOutcome::Duplicate;
        }

        if destination_exists() {
            return ClaimOutcome::Exists;
        }

        inner.in_flight.insert(url.to_string());
        ClaimOutcome::Acquired(DownloadClaim {
            record: Arc::clone(self),
            url: url.to_string(),
            completed: false,
        })
    }

    /// Returns true if the URL was downloaded successfully in this run
    pub fn contains(&self, url: &str) -> bool {
        self.lock().downloaded.contains(url)
    }

    /// Number of distinct image URLs downloaded in this run
    pub fn len(&self) -> usize {
        self.lock().downloaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the next number for a synthesized filename, starting at 1
    pub fn next_unnamed_index(&self) -> usize {
        self.unnamed.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Ownership of one in-flight image download
///
/// Calling `complete` records the URL as downloaded. Dropping the claim without
/// completing it (fetch failure, write failure, cancellation) releases the URL
/// so a later page may try again.
#[derive(Debug)]
pub struct DownloadClaim {
    record: Arc<DownloadRecord>,
    url: String,
    completed: bool,
}

impl DownloadClaim {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Moves the URL from in-flight to downloaded
    pub fn complete(mut self) {
        let mut inner = self.record.lock();
        inner.in_flight.remove(&self.url);
        inner.downloaded.insert(self.url.clone());
        self.completed = true;
    }
}

impl Drop for DownloadClaim {
    fn drop(&mut self) {
        if !self.completed {
            self.record.lock().in_flight.remove(&self.url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG: &str = "http://example.com/image.jpg";

    #[test]
    fn test_claim_then_complete() {
        let record = Arc::new(DownloadRecord::new());

        let claim = match record.try_claim(IMG, || false) {
            ClaimOutcome::Acquired(claim) => claim,
            other => panic!("expected claim, got {:?}", other),
        };
        assert_eq!(claim.url(), IMG);
        assert!(!record.contains(IMG));

        claim.complete();
        assert!(record.contains(IMG));
        assert_eq!(record.len(), 1);
        assert!(matches!(record.try_claim(IMG, || false), ClaimOutcome::Duplicate));
    }

    #[test]
    fn test_in_flight_url_is_duplicate() {
        let record = Arc::new(DownloadRecord::new());
        let _claim = record.try_claim(IMG, || false);
        assert!(matches!(record.try_claim(IMG, || false), ClaimOutcome::Duplicate));
    }

    #[test]
    fn test_dropped_claim_releases_url() {
        let record = Arc::new(DownloadRecord::new());
        {
            let claim = record.try_claim(IMG, || false);
            assert!(matches!(claim, ClaimOutcome::Acquired(_)));
        }
        assert!(record.is_empty());
        assert!(matches!(
            record.try_claim(IMG, || false),
            ClaimOutcome::Acquired(_)
        ));
    }

    #[test]
    fn test_existing_file_is_not_recorded() {
        let record = Arc::new(DownloadRecord::new());
        assert!(matches!(record.try_claim(IMG, || true), ClaimOutcome::Exists));
        assert!(!record.contains(IMG));
        assert!(record.is_empty());
    }

    #[test]
    fn test_existence_not_checked_for_duplicates() {
        let record = Arc::new(DownloadRecord::new());
        if let ClaimOutcome::Acquired(claim) = record.try_claim(IMG, || false) {
            claim.complete();
        }

        let outcome = record.try_claim(IMG, || panic!("existence check must be skipped"));
        assert!(matches!(outcome, ClaimOutcome::Duplicate));
    }

    #[test]
    fn test_unnamed_index_increases() {
        let record = DownloadRecord::new();
        assert_eq!(record.next_unnamed_index(), 1);
        assert_eq!(record.next_unnamed_index(), 2);
        assert_eq!(record.next_unnamed_index(), 3);
    }

    #[test]
    fn test_concurrent_claims_admit_one_winner() {
        let record = Arc::new(DownloadRecord::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let record = Arc::clone(&record);
                std::thread::spawn(move || match record.try_claim(IMG, || false) {
                    ClaimOutcome::Acquired(claim) => {
                        claim.complete();
                        true
                    }
                    _ => false,
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(record.len(), 1);
    }
}
