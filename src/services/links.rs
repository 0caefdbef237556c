// src/services/links.rs

//! Listing page traversal.
//!
//! Walks the paginated search listing for each topic and yields detail page
//! links, deduplicated across every topic of the session.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use scraper::Html;
use url::Url;

use crate::fetch::{FetchedPage, PageFetcher};
use crate::models::{CompiledSelectors, Config, Topic};
use crate::utils::date::parse_datetime;
use crate::utils::{query_index, resolve_url};

/// A detail page link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub url: String,
    /// Date shown next to the teaser, when present
    pub listed_at: Option<DateTime<FixedOffset>>,
}

/// Collects detail links for topics, one session at a time.
pub struct LinkCollector<'a> {
    config: &'a Config,
    selectors: &'a CompiledSelectors,
    fetcher: &'a dyn PageFetcher,
    visited: HashSet<String>,
}

impl<'a> LinkCollector<'a> {
    pub fn new(
        config: &'a Config,
        selectors: &'a CompiledSelectors,
        fetcher: &'a dyn PageFetcher,
    ) -> Self {
        Self {
            config,
            selectors,
            fetcher,
            visited: HashSet::new(),
        }
    }

    /// Number of distinct links seen so far in this session.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Collect the new links of one topic, in listing order.
    ///
    /// Failures never propagate: a failed first page yields nothing, a failed
    /// later page ends the topic with what was already collected.
    pub async fn collect(&mut self, topic: &Topic) -> Vec<ListingEntry> {
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        let mut entries = Vec::new();

        let first = match self.fetch_listing(topic, 0).await {
            Some(page) => page,
            None => return entries,
        };

        let (found, last_page) = self.parse_listing(&first);
        let last_page = last_page.min(self.config.crawler.max_pages.saturating_sub(1));
        log::debug!("Topic '{}': {} listing page(s)", topic, last_page + 1);
        self.absorb(found, &mut entries);

        for page_index in 1..=last_page {
            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }

            let Some(page) = self.fetch_listing(topic, page_index).await else {
                break;
            };
            let (found, _) = self.parse_listing(&page);
            self.absorb(found, &mut entries);
        }

        log::debug!("Topic '{}': {} new link(s)", topic, entries.len());
        entries
    }

    async fn fetch_listing(&self, topic: &Topic, page_index: usize) -> Option<FetchedPage> {
        let url = match self.config.source.listing_url(topic, page_index) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Topic '{}': cannot build listing url: {}", topic, e);
                return None;
            }
        };

        match self.fetcher.fetch_page(&url).await {
            Ok(page) => Some(page),
            Err(e) => {
                log::warn!(
                    "Topic '{}': listing page {} failed ({}): {}",
                    topic,
                    page_index,
                    url,
                    e
                );
                None
            }
        }
    }

    /// Teaser entries and the last page index announced by the pager.
    fn parse_listing(&self, page: &FetchedPage) -> (Vec<ListingEntry>, usize) {
        let Some(base) = Url::parse(&page.final_url)
            .or_else(|_| Url::parse(&page.url))
            .ok()
        else {
            return (Vec::new(), 0);
        };

        let document = Html::parse_document(&page.html);

        let entries = document
            .select(&self.selectors.teaser)
            .filter_map(|teaser| {
                let href = teaser
                    .select(&self.selectors.teaser_link)
                    .next()?
                    .value()
                    .attr("href")?;
                let url = resolve_url(&base, href)?;
                let listed_at = teaser.select(&self.selectors.teaser_date).next().and_then(|el| {
                    el.value()
                        .attr("datetime")
                        .and_then(parse_datetime)
                        .or_else(|| parse_datetime(&el.text().collect::<String>()))
                });
                Some(ListingEntry { url, listed_at })
            })
            .collect();

        let last_page = document
            .select(&self.selectors.pager_last)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| query_index(&base, href, &self.config.source.page_param))
            .unwrap_or(0);

        (entries, last_page)
    }

    fn absorb(&mut self, found: Vec<ListingEntry>, entries: &mut Vec<ListingEntry>) {
        for entry in found {
            if self.visited.insert(entry.url.clone()) {
                entries.push(entry);
            }
        }
    }
}
