//! Page fetching strategies.
//!
//! The harvester talks to the network only through [`PageFetcher`]. Plain
//! HTTP is the default; a headless browser is available behind the
//! `browser` feature for pages that need scripts to run.

#[cfg(feature = "browser")]
mod browser;
mod http;
#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CrawlerConfig, FetchStrategy};

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    pub html: String,
}

/// Source of HTML pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page. Non-success statuses and timeouts are errors.
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage>;

    /// Follow redirects from `url` and return where they land.
    ///
    /// Only transport failures are errors; the landing status is ignored.
    async fn resolve(&self, url: &str) -> Result<String>;
}

/// Build the fetcher selected by `crawler.strategy`.
pub async fn create_fetcher(config: &CrawlerConfig) -> Result<Arc<dyn PageFetcher>> {
    match config.strategy {
        FetchStrategy::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        #[cfg(feature = "browser")]
        FetchStrategy::Browser => Ok(Arc::new(BrowserFetcher::launch(config).await?)),
        #[cfg(not(feature = "browser"))]
        FetchStrategy::Browser => Err(crate::error::AppError::config(
            "crawler.strategy = \"browser\" needs the `browser` feature",
        )),
    }
}
