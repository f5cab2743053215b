pub mod client;
pub mod containers;
pub mod crawl;
pub mod digits;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod types;

pub use crawl::{Crawler, CrawlerConfig};
pub use digits::normalize_eastern_digits;
pub use error::CrawlerError;
pub use extract::extract_businesses;
pub use pagination::count_pages;
pub use types::{BusinessRecord, CrawlReport};
