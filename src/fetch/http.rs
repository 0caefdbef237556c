// src/fetch/http.rs

//! Plain HTTP fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::error::{AppError, Result};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetches pages with GET requests, following redirects.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    async fn send(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.send(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let response = self.get(url).await?;
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        log::debug!("Fetched {} ({} bytes)", final_url, html.len());
        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }

    async fn resolve(&self, url: &str) -> Result<String> {
        // Landing pages that refuse bots still count as landed.
        let response = self.send(url).await?;
        if !response.status().is_success() {
            log::debug!("{} landed on {} with {}", url, response.url(), response.status());
        }
        Ok(response.url().to_string())
    }
}

fn map_reqwest_error(url: &str, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::Timeout {
            url: url.to_string(),
        }
    } else {
        AppError::Http(error)
    }
}
