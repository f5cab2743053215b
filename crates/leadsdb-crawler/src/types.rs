use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A business extracted from one listing container.
///
/// Every field except `name` is best-effort; extraction drops the record
/// entirely when no name is found. Values are trimmed but otherwise kept as
/// they appear in the page markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Aggregated result of one crawl job.
///
/// `pages_crawled` counts only pages that were fetched and extracted
/// successfully, so it can trail `total_pages` when later pages fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub url: String,
    pub businesses: Vec<BusinessRecord>,
    pub count: usize,
    pub total_pages: usize,
    pub pages_crawled: usize,
    pub crawled_at: DateTime<Utc>,
}
