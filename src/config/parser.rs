use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, UrlError};
use std::path::Path;
use url::Url;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_gather::config::load_config;
///
/// let config = load_config(Path::new("gather.toml")).unwrap();
/// println!("Workers: {}", config.crawler.max_workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses the seed URL typed by the operator
///
/// The seed must be an absolute `http` or `https` URL with a host. Anything
/// else is a startup error, since the crawl has no domain to stay inside. The
/// fragment is dropped; it never names a different page.
pub fn parse_seed_url(input: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(input.trim())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_MAX_PAGES, DEFAULT_MAX_WORKERS};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-pages = 25
max-workers = 3

[http]
user-agent = "TestGatherer/1.0"
page-timeout-secs = 5
image-timeout-secs = 7

[output]
folder = "./pictures"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_pages, 25);
        assert_eq!(config.crawler.max_workers, 3);
        assert_eq!(config.http.user_agent, "TestGatherer/1.0");
        assert_eq!(config.http.page_timeout_secs, 5);
        assert_eq!(config.http.image_timeout_secs, 7);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.output.folder, PathBuf::from("./pictures"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.crawler.max_workers, DEFAULT_MAX_WORKERS);
        assert_eq!(config.output.folder, PathBuf::from("downloaded_images"));
        assert!(config.http.user_agent.starts_with("sumi-gather/"));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/gather.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
max-pages = 10
max-workers = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_seed_url() {
        let url = parse_seed_url("  http://example.com  ").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");

        assert!(parse_seed_url("https://example.com/gallery").is_ok());
    }

    #[test]
    fn test_parse_seed_url_drops_fragment() {
        let url = parse_seed_url("http://example.com/gallery#top").unwrap();
        assert_eq!(url.as_str(), "http://example.com/gallery");
    }

    #[test]
    fn test_parse_seed_url_rejects_bad_input() {
        assert!(matches!(parse_seed_url(""), Err(UrlError::Parse(_))));
        assert!(matches!(parse_seed_url("example.com"), Err(UrlError::Parse(_))));
        assert!(matches!(
            parse_seed_url("ftp://example.com/"),
            Err(UrlError::InvalidScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            parse_seed_url("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }
}
