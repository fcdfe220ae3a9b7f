//! Integration tests for collect mode

use crate::common::{config, strings, StaticSource};
use std::sync::Arc;
use trawl::crawler::Crawler;
use trawl::{ConfigError, CrawlConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GALLERY: &str = r#"
    <html><body>
        <div class="gallery">
            <img src="/img/b.png">
            <img src="https://cdn.gallery.com/a.jpg">
            <a href="/more">more</a>
        </div>
        <footer><img src="/img/logo.svg"></footer>
    </body></html>
"#;

const MORE: &str = r#"
    <html><body>
        <div class="gallery">
            <img src="/img/b.png">
            <img src="https://tracker.net/pixel.gif">
        </div>
    </body></html>
"#;

#[tokio::test]
async fn test_collect_images_sorted_and_deduplicated() {
    let source = Arc::new(StaticSource::new(&[
        ("https://gallery.com/", GALLERY),
        ("https://gallery.com/more", MORE),
    ]));
    let mut config = config(2, 2);
    config.selectors.exclude_domains = strings(&["tracker.net"]);
    let crawler = Crawler::new(config, source);

    let report = crawler
        .collect(&strings(&["https://gallery.com/"]))
        .await
        .unwrap();

    assert_eq!(
        report.result,
        strings(&[
            "https://cdn.gallery.com/a.jpg",
            "https://gallery.com/img/b.png",
            "https://gallery.com/img/logo.svg",
        ])
    );
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_collect_scoped_by_class() {
    let source = Arc::new(StaticSource::new(&[("https://gallery.com/", GALLERY)]));
    let mut config = config(1, 1);
    config.selectors.classes = strings(&["gallery"]);
    let crawler = Crawler::new(config, source);

    let report = crawler
        .collect(&strings(&["https://gallery.com/"]))
        .await
        .unwrap();

    assert_eq!(
        report.result,
        strings(&["https://cdn.gallery.com/a.jpg", "https://gallery.com/img/b.png"])
    );
}

#[tokio::test]
async fn test_collect_page_urls() {
    let source = Arc::new(StaticSource::new(&[
        ("https://site.com/", r#"<a href="/two">two</a>"#),
        ("https://site.com/two", "two"),
    ]));
    let mut config = config(2, 2);
    config.selectors.collections = strings(&["html"]);
    let crawler = Crawler::new(config, source);

    let report = crawler.collect(&strings(&["https://site.com/"])).await.unwrap();

    assert_eq!(
        report.result,
        strings(&["https://site.com/", "https://site.com/two"])
    );
}

#[tokio::test]
async fn test_collect_custom_extensions() {
    let source = Arc::new(StaticSource::new(&[(
        "https://data.gov/",
        r#"<a href="/files/2024.csv">csv</a><a href="/files/readme.txt">txt</a>"#,
    )]));
    let mut config = config(1, 1);
    config.selectors.collections = strings(&["csv"]);
    let crawler = Crawler::new(config, source);

    let report = crawler.collect(&strings(&["https://data.gov/"])).await.unwrap();

    assert_eq!(report.result, strings(&["https://data.gov/files/2024.csv"]));
}

#[tokio::test]
async fn test_failed_pages_contribute_no_items() {
    let source = Arc::new(StaticSource::new(&[(
        "https://gallery.com/",
        r#"<img src="/ok.png"><a href="/gone">gone</a>"#,
    )]));
    let crawler = Crawler::new(config(2, 2), source);

    let report = crawler
        .collect(&strings(&["https://gallery.com/"]))
        .await
        .unwrap();

    assert_eq!(report.result, strings(&["https://gallery.com/ok.png"]));
    assert_eq!(report.error_count, 1);
    assert_eq!(report.pages_visited, 2);
}

#[tokio::test]
async fn test_invalid_collection_is_fatal() {
    let source = Arc::new(StaticSource::new(&[("https://gallery.com/", GALLERY)]));
    let mut config = config(1, 1);
    config.selectors.collections = strings(&["jpg|(png"]);
    let crawler = Crawler::new(config, source.clone());

    let result = crawler.collect(&strings(&["https://gallery.com/"])).await;

    assert!(matches!(result, Err(ConfigError::InvalidCollection { .. })));
    assert_eq!(source.total_fetches(), 0);
}

#[tokio::test]
async fn test_collect_against_http_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body>
                    <a href="/report.pdf">Report</a>
                    <a href="/docs">Docs</a>
                    </body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/manual.pdf">Manual</a><a href="/report.pdf">Report</a>"#)
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let mut config = CrawlConfig {
        max_depth: 2,
        threads: 2,
        silent: true,
        ..CrawlConfig::default()
    };
    config.selectors.collections = strings(&["pdf"]);
    config.selectors.url_patterns = strings(&["docs"]);
    let crawler = Crawler::with_web_source(config).expect("Failed to build crawler");

    let report = crawler
        .collect(&[format!("{}/", base_url)])
        .await
        .expect("Collect failed");

    assert_eq!(
        report.result,
        vec![
            format!("{}/manual.pdf", base_url),
            format!("{}/report.pdf", base_url),
        ]
    );
    assert!(report.is_clean());
}
