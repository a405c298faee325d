//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests with a per-request timeout
//! - Reading response bodies chunk by chunk
//! - Error classification

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Human-readable reason for a failed fetch, or None on success
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            FetchResult::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_gather::config::HttpConfig;
/// use sumi_gather::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET and returns the response once its status is known to be a success
///
/// `timeout` bounds the whole request, body included, so callers that stream
/// the body with `Response::chunk` stay under the same limit.
///
/// # Returns
///
/// * `Ok(Response)` - 2xx response whose body has not been read yet
/// * `Err(FetchResult)` - `HttpError` or `NetworkError` describing the failure
pub async fn send_get(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<Response, FetchResult> {
    let response = client
        .get(url.as_str())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify_error(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchResult::HttpError {
            status_code: status.as_u16(),
        });
    }

    Ok(response)
}

/// Fetches a URL and reads its whole body
///
/// The body is read chunk by chunk as it arrives. `timeout` bounds the whole
/// request, body included, so a stalled server cannot hold a worker forever.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Upper bound for the request
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &Url, timeout: Duration) -> FetchResult {
    let mut response = match send_get(client, url, timeout).await {
        Ok(response) => response,
        Err(failure) => return failure,
    };

    let final_url = response.url().clone();
    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => return classify_error(&e),
        }
    }

    FetchResult::Success { final_url, body }
}

/// Maps a reqwest error onto a network failure
pub(crate) fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
