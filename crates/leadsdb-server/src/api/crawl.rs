//! `POST /api/crawl` — run one crawl job and return the aggregated report.

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{ApiError, AppState};
use leadsdb_crawler::{CrawlReport, CrawlerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct CrawlRequest {
    url: Option<String>,
    #[serde(default)]
    crawl_all_pages: bool,
}

pub(in crate::api) async fn crawl_listing(
    State(state): State<AppState>,
    Json(body): Json<CrawlRequest>,
) -> Result<Json<CrawlReport>, ApiError> {
    let Some(url) = body
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return Err(ApiError::bad_request("url is required"));
    };

    let report = state
        .crawler
        .crawl(url, body.crawl_all_pages)
        .await
        .map_err(map_crawler_error)?;

    Ok(Json(report))
}

/// Maps crawl failures onto the wire contract: 400 for bad input, 404 for
/// unresolvable targets, 408 for timeouts, 500 otherwise (carrying the
/// upstream message for diagnostics).
fn map_crawler_error(error: CrawlerError) -> ApiError {
    match &error {
        CrawlerError::InvalidUrl { .. } => ApiError::bad_request(error.to_string()),
        CrawlerError::HostUnreachable { .. } => ApiError::not_found(error.to_string()),
        CrawlerError::Timeout { .. } => ApiError::request_timeout(error.to_string()),
        CrawlerError::UnexpectedStatus { .. } | CrawlerError::Http(_) => {
            tracing::error!(error = %error, "crawl failed");
            ApiError::internal(format!("crawl failed: {error}"))
        }
    }
}
