//! In-memory fetcher for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::fetch::{FetchedPage, PageFetcher};

#[derive(Debug, Clone)]
enum Canned {
    Page(String),
    Redirect(String),
    Status(u16),
    Unreachable,
}

/// Serves canned pages by exact URL and records every request.
#[derive(Debug, Default)]
pub(crate) struct StubFetcher {
    routes: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.routes.insert(url.to_string(), Canned::Page(html.into()));
        self
    }

    pub(crate) fn redirect(mut self, from: &str, to: &str) -> Self {
        self.routes
            .insert(from.to_string(), Canned::Redirect(to.to_string()));
        self
    }

    pub(crate) fn status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(url.to_string(), Canned::Status(status));
        self
    }

    /// Route that fails like a dropped connection.
    pub(crate) fn unreachable(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Canned::Unreachable);
        self
    }

    /// URLs requested so far, in order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, url: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
    }

    /// Follow redirects; yields the landing URL with its page or status.
    fn lookup(&self, url: &str) -> Result<(String, Landing)> {
        let mut current = url.to_string();
        for _ in 0..5 {
            match self.routes.get(&current) {
                Some(Canned::Page(html)) => return Ok((current, Landing::Page(html.clone()))),
                Some(Canned::Redirect(to)) => current = to.clone(),
                Some(Canned::Status(status)) => return Ok((current, Landing::Status(*status))),
                Some(Canned::Unreachable) => return Err(AppError::Timeout { url: current }),
                None => return Ok((current, Landing::Status(404))),
            }
        }
        Err(AppError::status(current, 310))
    }
}

enum Landing {
    Page(String),
    Status(u16),
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        self.record(url);
        match self.lookup(url)? {
            (final_url, Landing::Page(html)) => Ok(FetchedPage {
                url: url.to_string(),
                final_url,
                html,
            }),
            (final_url, Landing::Status(status)) => Err(AppError::status(final_url, status)),
        }
    }

    async fn resolve(&self, url: &str) -> Result<String> {
        self.record(url);
        self.lookup(url).map(|(final_url, _)| final_url)
    }
}
