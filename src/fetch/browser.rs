//! Headless Chromium fetcher.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::models::CrawlerConfig;

/// Loads pages in a headless browser and returns the rendered DOM.
pub struct BrowserFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    page_load_timeout: Duration,
}

impl BrowserFetcher {
    /// Launch a headless browser.
    ///
    /// The CDP event loop runs on a background task for the fetcher's lifetime.
    pub async fn launch(config: &CrawlerConfig) -> Result<Self> {
        let browser_config = BrowserConfig::builder()
            .arg(format!("--user-agent={}", config.user_agent))
            .build()
            .map_err(AppError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::Browser(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        log::info!("Launched headless browser");
        Ok(Self {
            browser,
            handler,
            page_load_timeout: Duration::from_secs(config.page_load_timeout_secs),
        })
    }

    async fn load(&self, url: &str) -> Result<FetchedPage> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| AppError::Browser(e.to_string()))?;

        let loaded = async {
            page.wait_for_navigation()
                .await
                .map_err(|e| AppError::Browser(e.to_string()))?;
            let html = page
                .content()
                .await
                .map_err(|e| AppError::Browser(e.to_string()))?;
            let final_url = page
                .url()
                .await
                .map_err(|e| AppError::Browser(e.to_string()))?
                .unwrap_or_else(|| url.to_string());
            Ok::<_, AppError>((html, final_url))
        };

        let result = tokio::time::timeout(self.page_load_timeout, loaded).await;
        page.close().await.ok();

        let (html, final_url) = result.map_err(|_| AppError::Timeout {
            url: url.to_string(),
        })??;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }
}

impl Drop for BrowserFetcher {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        self.load(url).await
    }

    async fn resolve(&self, url: &str) -> Result<String> {
        Ok(self.load(url).await?.final_url)
    }
}
