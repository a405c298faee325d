//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and tempfile output
//! folders to test the full crawl cycle end-to-end.

use std::path::Path;
use sumi_gather::config::{parse_seed_url, Config};
use sumi_gather::crawler::crawl;
use sumi_gather::{CrawlSummary, GatherError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `output`
fn create_test_config(output: &Path, max_pages: usize) -> Config {
    let mut config = Config::default();
    config.crawler.max_pages = max_pages;
    config.crawler.max_workers = 2;
    config.http.page_timeout_secs = 5;
    config.http.image_timeout_secs = 5;
    config.output.folder = output.to_path_buf();
    config
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, route: &str, bytes: &[u8], expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn run_crawl(seed: &str, config: &Config) -> CrawlSummary {
    let seed = Url::parse(seed).expect("Failed to parse seed URL");
    crawl(&seed, config, CancellationToken::new())
        .await
        .expect("Crawl failed to start")
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <img src="/logo.png">
            <a href="/page1">Page 1</a>
            <a href="{}/page2">Page 2</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><img src="/logo.png"><img src="/photos/cat.jpg"></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body><img src="/photos/"><a href="/page1">Again</a></body></html>"#
            .to_string(),
    )
    .await;

    // logo.png appears on two pages but must be fetched once
    mount_image(&mock_server, "/logo.png", b"logo-bytes", 1).await;
    mount_image(&mock_server, "/photos/cat.jpg", b"cat-bytes", 1).await;
    mount_image(&mock_server, "/photos/", b"unnamed-bytes", 1).await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 100);
    let summary = run_crawl(&base_url, &config).await;

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.images_downloaded, 3);
    assert_eq!(summary.images.saved, 3);
    assert_eq!(summary.images.duplicate, 1);
    assert!(!summary.cancelled);

    assert_eq!(
        std::fs::read(output.path().join("logo.png")).unwrap(),
        b"logo-bytes"
    );
    assert_eq!(
        std::fs::read(output.path().join("cat.jpg")).unwrap(),
        b"cat-bytes"
    );
    assert_eq!(
        std::fs::read(output.path().join("image_1.jpg")).unwrap(),
        b"unnamed-bytes"
    );
}

#[tokio::test]
async fn test_other_hosts_are_never_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(0)
        .mount(&other_server)
        .await;

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{}/elsewhere">Other site</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="/inside">Inside</a>
            </body></html>"#,
            other_server.uri()
        ),
    )
    .await;
    mount_page(&mock_server, "/inside", "<html></html>".to_string()).await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 100);
    let summary = run_crawl(&mock_server.uri(), &config).await;

    assert_eq!(summary.pages_visited, 2);
}

#[tokio::test]
async fn test_page_cap_limits_visits() {
    let mock_server = MockServer::start().await;

    // Hub page linking to 14 more pages: 15 reachable pages in total
    let links: String = (1..=14)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", format!("<html><body>{}</body></html>", links)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(9)
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 10);
    let summary = run_crawl(&mock_server.uri(), &config).await;

    assert_eq!(summary.pages_visited, 10);
}

#[tokio::test]
async fn test_failing_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/ok">Ok</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", r#"<img src="/fine.gif">"#.to_string()).await;
    mount_image(&mock_server, "/fine.gif", b"GIF89a", 1).await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 100);
    let summary = run_crawl(&mock_server.uri(), &config).await;

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.images_downloaded, 1);
    assert!(output.path().join("fine.gif").exists());
}

#[tokio::test]
async fn test_failing_images_still_produce_summary() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<img src="/gone.png"><img src="/also-gone.png">"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"gone\.png$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 100);
    let summary = run_crawl(&mock_server.uri(), &config).await;

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.images_downloaded, 0);
    assert_eq!(summary.images_failed(), 2);
}

#[tokio::test]
async fn test_rerun_skips_existing_files() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<img src="/a.png"><img src="/b.png">"#.to_string(),
    )
    .await;
    // Fetched by the first run only
    mount_image(&mock_server, "/a.png", b"a", 1).await;
    // Already on disk before either run
    mount_image(&mock_server, "/b.png", b"b", 0).await;

    let output = TempDir::new().unwrap();
    std::fs::write(output.path().join("b.png"), b"old b").unwrap();
    let config = create_test_config(output.path(), 100);

    let first = run_crawl(&mock_server.uri(), &config).await;
    assert_eq!(first.images_downloaded, 1);
    assert_eq!(first.images.exists, 1);

    let second = run_crawl(&mock_server.uri(), &config).await;
    assert_eq!(second.images_downloaded, 0);
    assert_eq!(second.images.exists, 2);

    assert_eq!(std::fs::read(output.path().join("b.png")).unwrap(), b"old b");
}

#[tokio::test]
async fn test_output_folder_is_created() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<img src="/x.webp">"#.to_string()).await;
    mount_image(&mock_server, "/x.webp", b"webp", 1).await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("nested").join("images");
    let config = create_test_config(&output, 100);
    let summary = run_crawl(&mock_server.uri(), &config).await;

    assert_eq!(summary.images_downloaded, 1);
    assert!(output.join("x.webp").is_file());
}

#[tokio::test]
async fn test_uncreatable_output_folder_is_fatal() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let config = create_test_config(&blocker.join("images"), 100);
    let seed = Url::parse("http://127.0.0.1:9/").unwrap();
    let result = crawl(&seed, &config, CancellationToken::new()).await;

    assert!(matches!(result, Err(GatherError::Storage(_))));
}

#[tokio::test]
async fn test_seed_fragment_does_not_revisit_home() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/">Home</a><a href="/#top">Top</a>"#, "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 100);
    let seed = parse_seed_url(&format!("{}/#top", mock_server.uri())).unwrap();
    let summary = crawl(&seed, &config, CancellationToken::new())
        .await
        .expect("Crawl failed to start");

    assert_eq!(summary.pages_visited, 1);
}

#[tokio::test]
async fn test_redirect_off_site_is_not_crawled() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/go">Go</a>"#.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/page", other_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_page(
        &other_server,
        "/page",
        r#"<img src="/offsite.png"><a href="/secret">Secret</a>"#.to_string(),
    )
    .await;
    mount_image(&other_server, "/offsite.png", b"png", 0).await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(output.path(), 100);
    let summary = run_crawl(&mock_server.uri(), &config).await;

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.images.total(), 0);
    assert!(!output.path().join("offsite.png").exists());
}
