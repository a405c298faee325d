//! URL handling module for Sumi-Gather
//!
//! This module provides host extraction, link resolution, and the predicate
//! that decides whether a discovered link belongs to the crawl.

mod domain;
mod resolve;

use crate::state::CrawlState;
use url::Url;

// Re-export main functions
pub use domain::extract_host;
pub use resolve::{is_non_navigable, resolve_link};

/// Decides whether a candidate link should be followed
///
/// Rules, checked in order:
/// 1. `javascript:` / `mailto:` style actions and `#fragment` anchors are rejected
/// 2. The link must parse as an absolute http(s) URL whose host equals the
///    seed host exactly (subdomains do not match)
/// 3. The link must not already be in the visited set
///
/// Relative links must be resolved against their page before calling this.
/// The check has no side effects.
///
/// # Examples
///
/// ```
/// use sumi_gather::state::CrawlState;
/// use sumi_gather::url::is_crawlable;
/// use url::Url;
///
/// let seed = Url::parse("http://example.com").unwrap();
/// let state = CrawlState::new(&seed, 10).unwrap();
///
/// assert!(is_crawlable("https://example.com/page", &state));
/// assert!(!is_crawlable("http://other.com/page", &state));
/// assert!(!is_crawlable("javascript:void(0)", &state));
/// ```
pub fn is_crawlable(candidate: &str, state: &CrawlState) -> bool {
    if is_non_navigable(candidate) {
        return false;
    }

    let url = match Url::parse(candidate.trim()) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match extract_host(&url) {
        Some(host) if host == state.seed_host() => {}
        _ => return false,
    }

    !state.is_visited(url.as_str())
}
