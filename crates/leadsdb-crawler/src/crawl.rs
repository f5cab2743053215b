//! The crawl orchestrator: fetch → locate → extract across page 1..N.

use std::time::Duration;

use chrono::Utc;
use url::Url;

use leadsdb_core::app_config::DEFAULT_CRAWLER_USER_AGENT;
use leadsdb_core::AppConfig;

use crate::client::ListingClient;
use crate::error::CrawlerError;
use crate::extract::extract_businesses;
use crate::pagination::count_pages;
use crate::types::CrawlReport;

/// Tuning knobs for a [`Crawler`].
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Politeness throttle between successive page fetches. Load-bearing:
    /// listing sites are quick to block clients that hammer them.
    pub inter_page_delay_ms: u64,
    /// Upper bound on multi-page traversal; resolved totals above it are
    /// clamped.
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            user_agent: DEFAULT_CRAWLER_USER_AGENT.to_string(),
            inter_page_delay_ms: 1000,
            max_pages: 200,
        }
    }
}

impl CrawlerConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout_secs: config.crawler_request_timeout_secs,
            user_agent: config.crawler_user_agent.clone(),
            inter_page_delay_ms: config.crawler_inter_page_delay_ms,
            max_pages: config.crawler_max_pages,
        }
    }
}

/// Drives the fetch → extract cycle for one listing URL.
///
/// One crawl job per call; no state is shared between jobs, so concurrent
/// crawls of the same URL run fully independently.
pub struct Crawler {
    client: ListingClient,
    inter_page_delay: Duration,
    max_pages: usize,
}

impl Crawler {
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlerError> {
        Ok(Self {
            client: ListingClient::new(config.request_timeout_secs, &config.user_agent)?,
            inter_page_delay: Duration::from_millis(config.inter_page_delay_ms),
            max_pages: config.max_pages.max(1),
        })
    }

    /// Crawls a listing URL and aggregates the extracted records.
    ///
    /// Page 1 is always fetched and extracted. When `crawl_all_pages` is
    /// set and page 1's markup reveals more pages, pages 2..=N are fetched
    /// in strictly increasing order with the inter-page delay before each.
    /// Failures on those later pages are logged and skipped; only page 1
    /// failures abort the job.
    ///
    /// # Errors
    ///
    /// - [`CrawlerError::InvalidUrl`] — malformed or non-http(s) URL; no
    ///   fetch is attempted.
    /// - Any [`ListingClient::fetch_page`] error for page 1.
    pub async fn crawl(
        &self,
        url: &str,
        crawl_all_pages: bool,
    ) -> Result<CrawlReport, CrawlerError> {
        validate_listing_url(url)?;

        let first_page = self.client.fetch_page(url).await?;
        let mut businesses = extract_businesses(&first_page);

        let total_pages = if crawl_all_pages {
            self.capped_page_count(url, &first_page)
        } else {
            1
        };

        let mut pages_crawled = 1usize;
        for page in 2..=total_pages {
            tokio::time::sleep(self.inter_page_delay).await;

            let target = page_url(url, page);
            match self.client.fetch_page(&target).await {
                Ok(body) => {
                    let records = extract_businesses(&body);
                    tracing::debug!(page, records = records.len(), "extracted listing page");
                    businesses.extend(records);
                    pages_crawled += 1;
                }
                Err(error) => {
                    tracing::warn!(page, url = %target, error = %error, "skipping listing page after fetch failure");
                }
            }
        }

        tracing::info!(
            url,
            count = businesses.len(),
            total_pages,
            pages_crawled,
            "crawl finished"
        );

        Ok(CrawlReport {
            url: url.to_owned(),
            count: businesses.len(),
            businesses,
            total_pages,
            pages_crawled,
            crawled_at: Utc::now(),
        })
    }

    fn capped_page_count(&self, url: &str, first_page: &str) -> usize {
        let resolved = count_pages(first_page);
        if resolved > self.max_pages {
            tracing::warn!(
                url,
                resolved,
                cap = self.max_pages,
                "clamping resolved page count"
            );
            return self.max_pages;
        }
        resolved
    }
}

/// Rejects missing, malformed, and non-http(s) URLs before any I/O happens.
fn validate_listing_url(url: &str) -> Result<(), CrawlerError> {
    let parsed = Url::parse(url).map_err(|e| CrawlerError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CrawlerError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }

    Ok(())
}

/// Builds the URL for page N by appending a `page` parameter, respecting
/// whether the original URL already carries a query string.
fn page_url(base: &str, page: usize) -> String {
    if base.contains('?') {
        format!("{base}&page={page}")
    } else {
        format!("{base}?page={page}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_appends_query_separator() {
        assert_eq!(
            page_url("https://example.com/listings", 2),
            "https://example.com/listings?page=2"
        );
    }

    #[test]
    fn page_url_merges_into_existing_query() {
        assert_eq!(
            page_url("https://example.com/listings?city=tehran", 3),
            "https://example.com/listings?city=tehran&page=3"
        );
    }

    #[test]
    fn validate_rejects_relative_and_garbage_urls() {
        assert!(matches!(
            validate_listing_url("not-a-url"),
            Err(CrawlerError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_listing_url("/listings"),
            Err(CrawlerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_http_schemes() {
        assert!(matches!(
            validate_listing_url("ftp://example.com/listings"),
            Err(CrawlerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert!(validate_listing_url("http://example.com/listings").is_ok());
        assert!(validate_listing_url("https://example.com/listings?page=1").is_ok());
    }

    #[test]
    fn default_config_uses_a_one_second_politeness_delay() {
        let config = CrawlerConfig::default();
        assert_eq!(config.inter_page_delay_ms, 1000);
        assert_eq!(config.max_pages, 200);
    }
}
