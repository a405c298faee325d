use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default page-visit ceiling
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Default size of the image worker pool
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Default output folder for downloaded images
pub const DEFAULT_OUTPUT_FOLDER: &str = "downloaded_images";

/// Main configuration structure for Sumi-Gather
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl traversal limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to visit in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum number of images downloaded at the same time
    #[serde(rename = "max-workers")]
    pub max_workers: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for a whole page request, in seconds
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for a whole image request, in seconds
    #[serde(rename = "image-timeout-secs")]
    pub image_timeout_secs: u64,

    /// Timeout for establishing a connection, in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl HttpConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("sumi-gather/{}", env!("CARGO_PKG_VERSION")),
            page_timeout_secs: 30,
            image_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives downloaded images; created if absent
    pub folder: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
        }
    }
}
