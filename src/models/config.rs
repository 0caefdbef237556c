//! Application configuration structures.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{DocumentKind, SiteSelectors, Topic};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Which site section to harvest and which topics drive it
    #[serde(default)]
    pub source: SourceConfig,

    /// Stop conditions
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// CSS selectors for listing and detail pages
    #[serde(default)]
    pub selectors: SiteSelectors,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults only when the file is absent.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("No config at {:?}. Using defaults.", path.as_ref());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.page_load_timeout_secs == 0 {
            return Err(AppError::config(
                "crawler.page_load_timeout_secs must be > 0",
            ));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::config("crawler.max_pages must be > 0"));
        }
        if self.harvest.max_document_count == Some(0) {
            return Err(AppError::config(
                "harvest.max_document_count must be > 0 when set",
            ));
        }
        if self.selectors.doi_text.trim().is_empty() {
            return Err(AppError::config("selectors.doi_text is empty"));
        }
        self.source.validate()?;
        self.selectors.compile()?;
        Ok(())
    }
}

/// Page fetch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Plain HTTP GET requests
    #[default]
    Http,
    /// Headless Chromium (requires the `browser` feature)
    Browser,
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Browser page-load timeout in seconds
    #[serde(default = "defaults::page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Upper bound on listing pages walked per topic
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// How pages are fetched
    #[serde(default)]
    pub strategy: FetchStrategy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_load_timeout_secs: defaults::page_load_timeout(),
            request_delay_ms: defaults::request_delay(),
            max_pages: defaults::max_pages(),
            strategy: FetchStrategy::default(),
        }
    }
}

/// Site section and topic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Section landing page; decides the document kind
    #[serde(default = "defaults::start_url")]
    pub start_url: String,

    /// Listing search endpoint (defaults to `{start_url}/search`)
    #[serde(default)]
    pub search_url: Option<String>,

    /// Query parameter carrying the topic
    #[serde(default = "defaults::topic_param")]
    pub topic_param: String,

    /// Query parameter carrying the zero-based page index
    #[serde(default = "defaults::page_param")]
    pub page_param: String,

    /// Topics to enumerate, in order
    #[serde(default = "defaults::topics")]
    pub topics: Vec<Topic>,

    /// URL suffixes that mark a direct artifact behind a doi link
    #[serde(default = "defaults::artifact_suffixes")]
    pub artifact_suffixes: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            start_url: defaults::start_url(),
            search_url: None,
            topic_param: defaults::topic_param(),
            page_param: defaults::page_param(),
            topics: defaults::topics(),
            artifact_suffixes: defaults::artifact_suffixes(),
        }
    }
}

impl SourceConfig {
    /// Document kind targeted by the start URL.
    pub fn kind(&self) -> Result<DocumentKind> {
        DocumentKind::from_url(&self.start_url)
    }

    /// Parsed listing search endpoint.
    pub fn search_base(&self) -> Result<Url> {
        let raw = match &self.search_url {
            Some(url) => url.clone(),
            None => format!("{}/search", self.start_url.trim_end_matches('/')),
        };
        Url::parse(&raw).map_err(|e| AppError::config(format!("invalid search url '{raw}': {e}")))
    }

    /// Listing URL for one topic page.
    pub fn listing_url(&self, topic: &Topic, page: usize) -> Result<String> {
        let mut url = self.search_base()?;
        url.query_pairs_mut()
            .append_pair(&self.topic_param, topic.as_str())
            .append_pair(&self.page_param, &page.to_string());
        Ok(url.into())
    }

    fn validate(&self) -> Result<()> {
        if self.start_url.trim().is_empty() {
            return Err(AppError::config(
                "source.start_url must point at the news or publications section",
            ));
        }
        Url::parse(&self.start_url).map_err(|e| {
            AppError::config(format!("invalid source.start_url '{}': {e}", self.start_url))
        })?;
        self.kind()?;
        self.search_base()?;
        if self.topics.is_empty() {
            return Err(AppError::config("No topics defined"));
        }
        if self.topics.iter().any(|t| t.as_str().trim().is_empty()) {
            return Err(AppError::config("source.topics contains an empty topic"));
        }
        if self.topic_param.trim().is_empty() || self.page_param.trim().is_empty() {
            return Err(AppError::config(
                "source.topic_param and source.page_param must be set",
            ));
        }
        Ok(())
    }
}

/// Stop conditions for one harvest run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarvestConfig {
    /// Stop after this many documents
    #[serde(default)]
    pub max_document_count: Option<usize>,
}

mod defaults {
    use crate::models::Topic;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; nist-harvester/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn page_load_timeout() -> u64 {
        20
    }
    pub fn request_delay() -> u64 {
        500
    }
    pub fn max_pages() -> usize {
        200
    }

    // Source defaults
    pub fn start_url() -> String {
        "https://www.nist.gov/news-events/news".into()
    }
    pub fn topic_param() -> String {
        "k".into()
    }
    pub fn page_param() -> String {
        "page".into()
    }
    pub fn topics() -> Vec<Topic> {
        [
            "artificial intelligence",
            "cybersecurity",
            "quantum information science",
            "advanced manufacturing",
        ]
        .into_iter()
        .map(Topic::from)
        .collect()
    }
    pub fn artifact_suffixes() -> Vec<String> {
        vec![".pdf".into()]
    }
}
