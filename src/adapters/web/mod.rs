//! Website adapters. Implement PageFetcherPort.

pub mod page_fetcher;
pub mod static_fetcher;

pub use page_fetcher::{HttpPageFetcher, normalize_url, strip_html};
pub use static_fetcher::StaticPageFetcher;
