//! HTTP client for fetching listing pages.

use std::time::Duration;

use reqwest::Client;

use crate::error::CrawlerError;

/// Fetches listing pages with a bounded timeout and a browser-profile
/// user agent. Listing sites commonly reject obvious non-browser clients,
/// so the default UA mimics a desktop browser.
pub struct ListingClient {
    client: Client,
}

impl ListingClient {
    /// Creates a `ListingClient` with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CrawlerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches one page and returns its body as text.
    ///
    /// # Errors
    ///
    /// - [`CrawlerError::Timeout`] — the request or body read exceeded the timeout.
    /// - [`CrawlerError::HostUnreachable`] — DNS resolution or connect failure.
    /// - [`CrawlerError::UnexpectedStatus`] — any non-2xx response.
    /// - [`CrawlerError::Http`] — other transport failures.
    pub async fn fetch_page(&self, url: &str) -> Result<String, CrawlerError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9,fa;q=0.8")
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, e))
    }
}

/// Maps a transport-level failure onto the error taxonomy callers branch on:
/// timeouts and unreachable hosts get dedicated variants so "target is slow"
/// and "target doesn't exist" stay distinguishable.
fn classify_transport_error(url: &str, err: reqwest::Error) -> CrawlerError {
    if err.is_timeout() {
        CrawlerError::Timeout {
            url: url.to_owned(),
        }
    } else if err.is_connect() {
        CrawlerError::HostUnreachable {
            url: url.to_owned(),
        }
    } else {
        CrawlerError::Http(err)
    }
}
