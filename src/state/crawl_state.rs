//! Traversal state for a single crawl run
//!
//! The state is owned by the scheduler and passed by reference into the page
//! processor. Only the single traversal task mutates it, so it needs no lock.

use crate::url::extract_host;
use crate::UrlError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Queue, visited set, and limits for one crawl
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Host every followed link must share with the seed
    seed_host: String,

    /// Pages already dequeued for processing; grows monotonically
    visited: HashSet<String>,

    /// Pages waiting to be processed, in discovery order
    queue: VecDeque<Url>,

    /// Mirror of `queue` for constant-time membership checks
    queued: HashSet<String>,

    /// Maximum number of pages to visit
    page_count_cap: usize,
}

impl CrawlState {
    /// Creates the state for a crawl starting at `seed`
    ///
    /// The seed is queued immediately with its fragment removed, the same key
    /// any link back to it resolves to; nothing is visited yet.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlState)` - Fresh state with the seed queued
    /// * `Err(UrlError::MissingHost)` - The seed has no host to scope the crawl to
    pub fn new(seed: &Url, page_count_cap: usize) -> Result<Self, UrlError> {
        let seed_host = extract_host(seed).ok_or(UrlError::MissingHost)?;

        let mut state = Self {
            seed_host,
            visited: HashSet::new(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            page_count_cap,
        };
        let mut seed = seed.clone();
        seed.set_fragment(None);
        state.enqueue(seed);

        Ok(state)
    }

    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }

    pub fn page_count_cap(&self) -> usize {
        self.page_count_cap
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Records a page as visited
    ///
    /// Returns false if the page was already visited.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Iterates over the visited page URLs in no particular order
    pub fn visited(&self) -> impl Iterator<Item = &str> {
        self.visited.iter().map(String::as_str)
    }

    /// Returns true once the page-count cap has been reached
    pub fn cap_reached(&self) -> bool {
        self.visited.len() >= self.page_count_cap
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Appends a URL to the back of the queue
    ///
    /// The URL is ignored if it was already visited or is already waiting in
    /// the queue, so no page is ever queued twice at the same time.
    ///
    /// # Returns
    ///
    /// true if the URL was queued
    pub fn enqueue(&mut self, url: Url) -> bool {
        let key = url.as_str();
        if self.visited.contains(key) || self.queued.contains(key) {
            return false;
        }

        self.queued.insert(key.to_string());
        self.queue.push_back(url);
        true
    }

    /// Pops the next URL to process
    ///
    /// Returns None when the queue is empty or the page-count cap is reached.
    pub fn pop_next(&mut self) -> Option<Url> {
        if self.cap_reached() {
            return None;
        }

        let url = self.queue.pop_front()?;
        self.queued.remove(url.as_str());
        Some(url)
    }
}
