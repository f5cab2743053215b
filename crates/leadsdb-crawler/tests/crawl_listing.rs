//! Integration tests for `Crawler::crawl`.
//!
//! Uses `wiremock` to stand up a local listing site for each test so no
//! real network traffic is made. Fixtures mimic a directory page: repeated
//! `article` containers plus a numbered pagination nav.

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadsdb_crawler::{Crawler, CrawlerConfig, CrawlerError};

/// Builds a `Crawler` suitable for tests: short timeout, no politeness delay.
fn test_crawler() -> Crawler {
    Crawler::new(&CrawlerConfig {
        request_timeout_secs: 5,
        user_agent: "leadsdb-test/0.1".to_string(),
        inter_page_delay_ms: 0,
        max_pages: 200,
    })
    .expect("failed to build test Crawler")
}

/// First listing page: three named businesses and a pagination nav with
/// numbered links up to `last_page` (no explicit last-page link).
fn first_page_html(last_page: usize) -> String {
    let nav_links: String = (1..=last_page)
        .map(|n| format!("<a href='/listings?page={n}'>{n}</a>"))
        .collect();
    format!(
        "<html><body>\
         <article><h2>Cafe One</h2><a href='tel:+981'>call</a></article>\
         <article><h2>Cafe Two</h2><a href='tel:+982'>call</a></article>\
         <article><h2>Cafe Three</h2><a href='tel:+983'>call</a></article>\
         <nav aria-label='Page navigation'>{nav_links}</nav>\
         </body></html>"
    )
}

/// Later listing pages: a single named business.
fn later_page_html(name: &str) -> String {
    format!(
        "<html><body>\
         <article><h2>{name}</h2><a href='tel:+989'>call</a></article>\
         </body></html>"
    )
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

// ---------------------------------------------------------------------------
// Multi-page traversal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn crawl_all_pages_visits_every_resolved_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param_is_missing("page"))
        .respond_with(html_response(first_page_html(4)))
        .expect(1)
        .mount(&server)
        .await;

    for (page, name) in [(2, "Deli Two"), (3, "Deli Three"), (4, "Deli Four")] {
        Mock::given(method("GET"))
            .and(path("/listings"))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(html_response(later_page_html(name)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let url = format!("{}/listings", server.uri());
    let report = test_crawler().crawl(&url, true).await.expect("crawl");

    assert_eq!(report.total_pages, 4);
    assert_eq!(report.pages_crawled, 4);
    assert_eq!(report.count, 6, "3 from page 1 plus 1 from each later page");
    assert_eq!(report.count, report.businesses.len());
    assert_eq!(report.url, url);
    assert_eq!(report.businesses[0].name, "Cafe One");
    assert_eq!(report.businesses[3].name, "Deli Two");
}

#[tokio::test]
async fn single_page_mode_ignores_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param_is_missing("page"))
        .respond_with(html_response(first_page_html(4)))
        .expect(1)
        .mount(&server)
        .await;

    // Later pages must never be requested in single-page mode.
    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page", "2"))
        .respond_with(html_response(later_page_html("Deli Two")))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}/listings", server.uri());
    let report = test_crawler().crawl(&url, false).await.expect("crawl");

    assert_eq!(report.total_pages, 1);
    assert_eq!(report.pages_crawled, 1);
    assert_eq!(report.count, 3);
}

#[tokio::test]
async fn failed_page_is_skipped_and_crawl_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param_is_missing("page"))
        .respond_with(html_response(first_page_html(4)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page", "2"))
        .respond_with(html_response(later_page_html("Deli Two")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page", "4"))
        .respond_with(html_response(later_page_html("Deli Four")))
        .mount(&server)
        .await;

    let url = format!("{}/listings", server.uri());
    let report = test_crawler().crawl(&url, true).await.expect("crawl");

    assert_eq!(report.total_pages, 4);
    assert_eq!(report.pages_crawled, 3, "page 3 failed and was skipped");
    assert_eq!(report.count, 5);
}

#[tokio::test]
async fn resolved_page_count_is_clamped_to_the_configured_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param_is_missing("page"))
        .respond_with(html_response(first_page_html(5)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page", "2"))
        .respond_with(html_response(later_page_html("Deli Two")))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = Crawler::new(&CrawlerConfig {
        request_timeout_secs: 5,
        user_agent: "leadsdb-test/0.1".to_string(),
        inter_page_delay_ms: 0,
        max_pages: 2,
    })
    .expect("crawler");

    let url = format!("{}/listings", server.uri());
    let report = crawler.crawl(&url, true).await.expect("crawl");

    assert_eq!(report.total_pages, 2);
    assert_eq!(report.pages_crawled, 2);
}

// ---------------------------------------------------------------------------
// Failure mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_url_errors_without_any_fetch() {
    let result = test_crawler().crawl("not-a-url", true).await;
    assert!(
        matches!(result, Err(CrawlerError::InvalidUrl { .. })),
        "expected InvalidUrl, got: {result:?}"
    );
}

#[tokio::test]
async fn first_page_error_status_fails_the_whole_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = format!("{}/listings", server.uri());
    let result = test_crawler().crawl(&url, false).await;
    assert!(
        matches!(result, Err(CrawlerError::UnexpectedStatus { status: 403, .. })),
        "expected UnexpectedStatus(403), got: {result:?}"
    );
}

#[tokio::test]
async fn unresolvable_host_maps_to_host_unreachable() {
    // The .invalid TLD is reserved and guaranteed not to resolve.
    let result = test_crawler()
        .crawl("http://listings.invalid/shops", false)
        .await;
    assert!(
        matches!(result, Err(CrawlerError::HostUnreachable { .. })),
        "expected HostUnreachable, got: {result:?}"
    );
}
