//! Integration tests for crawl mode

use crate::common::{config, strings, StaticSource};
use std::sync::Arc;
use trawl::crawler::{Crawler, FetchMode};
use trawl::{CrawlConfig, FetchError, PageError, Selectors};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_link_text_pattern_end_to_end() {
    let source = Arc::new(StaticSource::new(&[
        (
            "https://site.com/a",
            r#"<a href="/b">go</a><a href="/c">stop</a>"#,
        ),
        ("https://site.com/b", "<p>b</p>"),
        ("https://site.com/c", "<p>c</p>"),
    ]));
    let mut config = config(2, 2);
    config.selectors.link_text_patterns = strings(&["go"]);
    let crawler = Crawler::new(config, source.clone());

    let report = crawler.crawl(&strings(&["https://site.com/a"])).await.unwrap();

    assert_eq!(
        report.result.keys().cloned().collect::<Vec<_>>(),
        strings(&["https://site.com/a", "https://site.com/b"])
    );
    assert_eq!(report.result["https://site.com/b"], "<p>b</p>");
    assert_eq!(source.fetch_count("https://site.com/c"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_dense_cycles_fetch_each_page_once() {
    let urls: Vec<String> = (0..20).map(|i| format!("https://mesh.com/{}", i)).collect();
    let body: String = (0..20)
        .map(|i| format!(r#"<a href="/{}">{}</a>"#, i, i))
        .collect();
    let pages: Vec<(&str, &str)> = urls.iter().map(|u| (u.as_str(), body.as_str())).collect();

    let source = Arc::new(StaticSource::new(&pages));
    let crawler = Crawler::new(config(5, 16), source.clone());

    let report = crawler.crawl(&strings(&["https://mesh.com/0"])).await.unwrap();

    assert_eq!(report.result.len(), 20);
    assert_eq!(source.total_fetches(), 20);
    for url in &urls {
        assert_eq!(source.fetch_count(url), 1, "{} fetched more than once", url);
    }
}

#[tokio::test]
async fn test_depth_bound() {
    let source = Arc::new(StaticSource::new(&[
        ("https://chain.com/1", r#"<a href="/2">next</a>"#),
        ("https://chain.com/2", r#"<a href="/3">next</a>"#),
        ("https://chain.com/3", r#"<a href="/4">next</a>"#),
        ("https://chain.com/4", "end"),
    ]));
    let crawler = Crawler::new(config(3, 2), source.clone());

    let report = crawler.crawl(&strings(&["https://chain.com/1"])).await.unwrap();

    assert_eq!(report.result.len(), 3);
    assert!(!report.result.contains_key("https://chain.com/4"));
    assert_eq!(source.fetch_count("https://chain.com/4"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_link_budget() {
    let hub: String = (0..10)
        .map(|i| format!(r#"<a href="/leaf{}">leaf</a>"#, i))
        .collect();
    let leaves: Vec<String> = (0..10).map(|i| format!("https://hub.com/leaf{}", i)).collect();
    let mut pages: Vec<(&str, &str)> = vec![("https://hub.com/", hub.as_str())];
    pages.extend(leaves.iter().map(|u| (u.as_str(), "leaf")));

    let source = Arc::new(StaticSource::new(&pages));
    let mut config = config(2, 4);
    config.max_links = 4;
    let crawler = Crawler::new(config, source.clone());

    let report = crawler.crawl(&strings(&["https://hub.com/"])).await.unwrap();

    assert_eq!(report.result.len(), 4);
    assert_eq!(source.total_fetches(), 4);
}

#[tokio::test]
async fn test_excluded_urls_are_never_fetched_or_reported() {
    let source = Arc::new(StaticSource::new(&[
        (
            "https://site.com/",
            r#"<a href="/private">private</a><a href="/public">public</a>"#,
        ),
        ("https://site.com/private", "secret"),
        ("https://site.com/public", "open"),
    ]));
    let mut config = config(2, 2);
    config.selectors.excluded_urls = strings(&["https://site.com/private"]);
    let crawler = Crawler::new(config, source.clone());

    let report = crawler.crawl(&strings(&["https://site.com/"])).await.unwrap();

    assert_eq!(source.fetch_count("https://site.com/private"), 0);
    assert!(!report.result.contains_key("https://site.com/private"));
    assert!(report.result.contains_key("https://site.com/public"));
    assert_eq!(report.pages_visited, 3);
}

#[tokio::test]
async fn test_exclude_domain_takes_precedence() {
    let source = Arc::new(StaticSource::new(&[
        (
            "https://www.example.com/",
            r#"
                <a href="https://ads.example.com/x">ad</a>
                <a href="https://blog.example.com/y">blog</a>
                <a href="https://other.org/z">other</a>
            "#,
        ),
        ("https://ads.example.com/x", "ad"),
        ("https://blog.example.com/y", "blog"),
        ("https://other.org/z", "other"),
    ]));
    let mut config = config(2, 2);
    config.selectors = Selectors {
        domains: strings(&["example.com"]),
        exclude_domains: strings(&["ads.example.com"]),
        ..Selectors::default()
    };
    let crawler = Crawler::new(config, source.clone());

    let report = crawler
        .crawl(&strings(&["https://www.example.com/"]))
        .await
        .unwrap();

    assert_eq!(
        report.result.keys().cloned().collect::<Vec<_>>(),
        strings(&["https://blog.example.com/y", "https://www.example.com/"])
    );
    assert_eq!(source.fetch_count("https://ads.example.com/x"), 0);
    assert_eq!(source.fetch_count("https://other.org/z"), 0);
}

#[tokio::test]
async fn test_content_gate_prunes_pages() {
    let source = Arc::new(StaticSource::new(&[
        (
            "https://news.com/",
            r#"keep <a href="/miss">miss</a><a href="/hit">hit</a>"#,
        ),
        ("https://news.com/miss", r#"nothing <a href="/deep">deep</a>"#),
        ("https://news.com/hit", "keep this"),
        ("https://news.com/deep", "keep"),
    ]));
    let mut config = config(3, 2);
    config.selectors.content_patterns = strings(&["keep"]);
    let crawler = Crawler::new(config, source.clone());

    let report = crawler.crawl(&strings(&["https://news.com/"])).await.unwrap();

    assert_eq!(report.result["https://news.com/miss"], "");
    assert_eq!(report.result["https://news.com/hit"], "keep this");
    assert_eq!(source.fetch_count("https://news.com/miss"), 1);
    assert_eq!(source.fetch_count("https://news.com/deep"), 0);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_content_gate_applies_to_seeds() {
    let source = Arc::new(StaticSource::new(&[
        ("https://news.com/", r#"<a href="/next">next</a>"#),
        ("https://news.com/next", "keep"),
    ]));
    let mut config = config(2, 1);
    config.selectors.content_patterns = strings(&["keep"]);
    let crawler = Crawler::new(config, source.clone());

    let report = crawler.crawl(&strings(&["https://news.com/"])).await.unwrap();

    assert_eq!(report.result.len(), 1);
    assert_eq!(report.result["https://news.com/"], "");
    assert_eq!(source.fetch_count("https://news.com/next"), 0);
}

#[tokio::test]
async fn test_selector_scope_limits_links() {
    let source = Arc::new(StaticSource::new(&[
        (
            "https://scope.com/",
            r#"<div class="tax"><a href="/a">A</a></div><div><a href="/b">B</a></div>"#,
        ),
        ("https://scope.com/a", "a"),
        ("https://scope.com/b", "b"),
    ]));
    let mut config = config(2, 2);
    config.selectors.classes = strings(&["tax"]);
    let crawler = Crawler::new(config, source.clone());

    let report = crawler.crawl(&strings(&["https://scope.com/"])).await.unwrap();

    assert!(report.result.contains_key("https://scope.com/a"));
    assert!(!report.result.contains_key("https://scope.com/b"));
    assert_eq!(source.fetch_count("https://scope.com/b"), 0);
}

#[tokio::test]
async fn test_search_terms_store_empty_payloads() {
    let source = Arc::new(StaticSource::new(&[
        (
            "https://docs.com/",
            r#"<p>install with cargo</p><a href="/guide">guide</a>"#,
        ),
        ("https://docs.com/guide", "<p>nothing here</p>"),
    ]));
    let mut config = config(2, 2);
    config.search_any = strings(&["cargo"]);
    let crawler = Crawler::new(config, source);

    let report = crawler.crawl(&strings(&["https://docs.com/"])).await.unwrap();

    assert_eq!(report.result.len(), 2);
    assert!(report.result.values().all(|payload| payload.is_empty()));
    assert_eq!(report.search_hits.len(), 1);
    assert_eq!(report.search_hits[0].url, "https://docs.com/");
    assert_eq!(report.search_hits[0].term, "cargo");
}

#[tokio::test]
async fn test_js_depth_selects_rendered_fetches() {
    let source = Arc::new(StaticSource::new(&[
        ("https://app.com/", r#"<a href="/child">child</a>"#),
        ("https://app.com/child", "child"),
    ]));
    let mut config = config(2, 1);
    config.js_depth = 1;
    let crawler = Crawler::new(config, source.clone());

    crawler.crawl(&strings(&["https://app.com/"])).await.unwrap();

    assert_eq!(source.mode_of("https://app.com/"), Some(FetchMode::Rendered));
    assert_eq!(source.mode_of("https://app.com/child"), Some(FetchMode::Plain));
}

#[tokio::test]
async fn test_duplicate_seeds_and_fresh_state_per_call() {
    let source = Arc::new(StaticSource::new(&[("https://one.com/", "one")]));
    let crawler = Crawler::new(config(1, 2), source.clone());
    let seeds = strings(&["https://one.com/", "https://one.com/#top"]);

    let first = crawler.crawl(&seeds).await.unwrap();
    let second = crawler.crawl(&seeds).await.unwrap();

    assert_eq!(first.result, second.result);
    assert_eq!(source.fetch_count("https://one.com/"), 2);
}

#[tokio::test]
async fn test_crawl_against_http_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body>
                    <a href="/page1">Page 1</a>
                    <a href="/page2">Page 2</a>
                    <a href="/missing">Missing</a>
                    </body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Content 1</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><a href="/page1">back</a></body></html>"#)
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = CrawlConfig {
        max_depth: 3,
        threads: 4,
        silent: true,
        ..CrawlConfig::default()
    };
    let crawler = Crawler::with_web_source(config).expect("Failed to build crawler");

    let report = crawler
        .crawl(&[format!("{}/", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.result.len(), 4);
    assert_eq!(
        report.result[&format!("{}/page1", base_url)],
        "<html><body>Content 1</body></html>"
    );
    assert_eq!(report.result[&format!("{}/missing", base_url)], "");
    assert_eq!(report.error_count, 1);
    assert!(matches!(
        report.error,
        Some(PageError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_server_error_is_partial_not_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&mock_server)
        .await;

    let config = CrawlConfig {
        threads: 2,
        silent: true,
        ..CrawlConfig::default()
    };
    let crawler = Crawler::with_web_source(config).expect("Failed to build crawler");

    let report = crawler
        .crawl(&[format!("{}/", base_url), format!("{}/ok", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.result[&format!("{}/ok", base_url)], "fine");
    assert!(matches!(
        report.error,
        Some(PageError::Fetch(FetchError::Status { status: 500, .. }))
    ));
}
