//! HTML parser for extracting links and images
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags)
//! - Images to download (from <img> tags)

use crate::url::resolve_link;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Outbound links, absolute, in document order without repeats
    pub links: Vec<Url>,

    /// Image sources, absolute, in document order without repeats
    pub images: Vec<Url>,
}

/// Parses HTML content and extracts links and image sources
///
/// # Extraction Rules
///
/// **Links:** `<a href="...">`, except `<a href="..." download>`
///
/// **Images:** `<img src="...">`
///
/// Both are resolved against `base_url`. Values that are empty, fragment-only,
/// `javascript:`, `mailto:`, `tel:`, or `data:` are dropped, as is anything
/// that does not resolve to http(s). Fragments are stripped from the result.
///
/// Malformed markup never fails: the parser recovers the way browsers do and
/// yields whatever elements it could find.
///
/// # Example
///
/// ```
/// use sumi_gather::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<a href="/page">Link</a><img src="cat.png">"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// assert_eq!(parsed.images[0].as_str(), "https://example.com/cat.png");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, base_url),
        images: extract_images(&document, base_url),
    }
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = UniqueUrls::default();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                links.push(resolve_link(href, base_url));
            }
        }
    }

    links.into_vec()
}

/// Extracts all image sources from the HTML document
fn extract_images(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut images = UniqueUrls::default();

    if let Ok(img_selector) = Selector::parse("img[src]") {
        for element in document.select(&img_selector) {
            if let Some(src) = element.value().attr("src") {
                images.push(resolve_link(src, base_url));
            }
        }
    }

    images.into_vec()
}

/// Collects URLs in first-seen order, ignoring repeats
#[derive(Default)]
struct UniqueUrls {
    seen: HashSet<String>,
    urls: Vec<Url>,
}

impl UniqueUrls {
    fn push(&mut self, url: Option<Url>) {
        if let Some(url) = url {
            if self.seen.insert(url.as_str().to_string()) {
                self.urls.push(url);
            }
        }
    }

    fn into_vec(self) -> Vec<Url> {
        self.urls
    }
}
