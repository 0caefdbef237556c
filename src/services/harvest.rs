// src/services/harvest.rs

//! Harvest controller.
//!
//! Enumerates topics, merges their links, extracts each document in order and
//! applies the stop conditions (boundary document, maximum count).

use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::models::{CompiledSelectors, Config, Document, DocumentKind};
use crate::services::{DocumentExtractor, LinkCollector, ListingEntry};

/// Why a harvest ended before exhausting its links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last harvested document of a previous run was reached
    BoundaryReached,
    /// The configured maximum number of documents was collected
    MaxCountReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundaryReached => f.write_str("boundary document reached"),
            Self::MaxCountReached => f.write_str("maximum document count reached"),
        }
    }
}

/// Lifecycle of one harvest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HarvestState {
    #[default]
    Idle,
    EnumeratingTopics,
    CollectingLinks,
    ExtractingDocuments,
    Done,
    Stopped(StopReason),
}

/// Counters for one harvest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    pub topics: usize,
    pub links: usize,
    pub extraction_failures: usize,
    pub duplicates: usize,
}

/// Result of a harvest run.
#[derive(Debug)]
pub struct HarvestOutcome {
    pub documents: Vec<Document>,
    pub state: HarvestState,
    pub stats: HarvestStats,
}

impl HarvestOutcome {
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state {
            HarvestState::Stopped(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Harvests documents from one site section.
pub struct Harvester {
    config: Arc<Config>,
    kind: DocumentKind,
    selectors: CompiledSelectors,
    fetcher: Arc<dyn PageFetcher>,
    last_document: Option<Document>,
}

impl Harvester {
    /// Create a harvester. Invalid configuration is rejected here, before any fetch.
    pub fn new(config: Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        config.validate()?;
        let kind = config.source.kind()?;
        let selectors = config.selectors.compile()?;

        Ok(Self {
            config: Arc::new(config),
            kind,
            selectors,
            fetcher,
            last_document: None,
        })
    }

    /// Stop when this document (from a previous run) is reached again.
    pub fn with_last_document(mut self, document: Document) -> Self {
        self.last_document = Some(document);
        self
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Harvest and return the new documents, in discovery order.
    pub async fn harvest(&self) -> Vec<Document> {
        self.run().await.documents
    }

    /// Harvest and report the final state and counters alongside the documents.
    pub async fn run(&self) -> HarvestOutcome {
        let mut session = HarvestSession::new(
            self.last_document.as_ref().map(Document::content_hash),
            self.config.harvest.max_document_count,
        );

        session.enter(HarvestState::EnumeratingTopics);
        let links = self.collect_links(&mut session).await;

        session.enter(HarvestState::ExtractingDocuments);
        let extractor = DocumentExtractor::new(
            self.kind,
            &self.selectors,
            self.fetcher.as_ref(),
            &self.config.source.artifact_suffixes,
        );
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);

        for (index, entry) in links.iter().enumerate() {
            if index > 0 && delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }

            let extracted = match extractor.extract(&entry.url).await {
                Ok(extracted) => extracted,
                Err(e) => {
                    session.stats.extraction_failures += 1;
                    if e.is_recoverable() {
                        log::warn!("Skipping {}: {}", entry.url, e);
                    } else {
                        log::error!("Skipping {}: {}", entry.url, e);
                    }
                    continue;
                }
            };

            let document = Document::new(extracted, Utc::now());
            if let ControlFlow::Break(reason) = session.accept(document) {
                session.enter(HarvestState::Stopped(reason));
                return session.finish();
            }
        }

        session.enter(HarvestState::Done);
        session.finish()
    }

    async fn collect_links(&self, session: &mut HarvestSession) -> Vec<ListingEntry> {
        let mut collector =
            LinkCollector::new(&self.config, &self.selectors, self.fetcher.as_ref());
        let mut links = Vec::new();

        for topic in &self.config.source.topics {
            session.enter(HarvestState::CollectingLinks);
            session.stats.topics += 1;
            let entries = collector.collect(topic).await;
            log::info!("Topic '{}': {} link(s)", topic, entries.len());
            links.extend(entries);
        }

        session.stats.links = links.len();
        links
    }
}

/// Mutable state owned by a single run.
struct HarvestSession {
    state: HarvestState,
    documents: Vec<Document>,
    seen_hashes: HashSet<String>,
    boundary_hash: Option<String>,
    max_count: Option<usize>,
    stats: HarvestStats,
}

impl HarvestSession {
    fn new(boundary_hash: Option<String>, max_count: Option<usize>) -> Self {
        Self {
            state: HarvestState::Idle,
            documents: Vec::new(),
            seen_hashes: HashSet::new(),
            boundary_hash,
            max_count,
            stats: HarvestStats::default(),
        }
    }

    fn enter(&mut self, state: HarvestState) {
        if self.state != state {
            log::debug!("Harvest state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Apply the stop conditions to a freshly extracted document.
    fn accept(&mut self, document: Document) -> ControlFlow<StopReason> {
        let hash = document.content_hash();

        if self.boundary_hash.as_deref() == Some(hash.as_str()) {
            log::info!(
                "Reached previously harvested document '{}', stopping",
                document.title()
            );
            return ControlFlow::Break(StopReason::BoundaryReached);
        }

        if !self.seen_hashes.insert(hash) {
            self.stats.duplicates += 1;
            log::debug!("Duplicate document skipped: {}", document.web_link());
            return ControlFlow::Continue(());
        }

        log::info!(
            "Harvested title={:?} link={} published={}",
            document.title(),
            document.web_link(),
            document.publication_date().to_rfc3339()
        );
        self.documents.push(document);

        match self.max_count {
            Some(max) if self.documents.len() >= max => {
                ControlFlow::Break(StopReason::MaxCountReached)
            }
            _ => ControlFlow::Continue(()),
        }
    }

    fn finish(self) -> HarvestOutcome {
        HarvestOutcome {
            documents: self.documents,
            state: self.state,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::fetch::stub::StubFetcher;
    use crate::models::sample_document;
    use crate::services::fixtures::{
        listing_html, listing_url, news_config, news_html, publication_html, publications_config,
    };

    fn news_url(slug: &str) -> String {
        format!("https://www.nist.gov/news-events/news/2024/03/{slug}")
    }

    /// Two topics, five distinct articles; "c" is listed by both topics.
    fn news_site(config: &Config) -> StubFetcher {
        let (a, b, c, d, e) = (
            news_url("a"),
            news_url("b"),
            news_url("c"),
            news_url("d"),
            news_url("e"),
        );
        StubFetcher::new()
            .page(&listing_url(config, "ai", 0), listing_html(&[&a, &b], Some(1)))
            .page(&listing_url(config, "ai", 1), listing_html(&[&c], Some(1)))
            .page(&listing_url(config, "quantum", 0), listing_html(&[&c, &d, &e], None))
            .page(&a, news_html("Article A", "2024-03-12T10:00:00-04:00"))
            .page(&b, news_html("Article B", "2024-03-11T10:00:00-04:00"))
            .page(&c, news_html("Article C", "2024-03-10T10:00:00-04:00"))
            .page(&d, news_html("Article D", "2024-03-09T10:00:00-04:00"))
            .page(&e, news_html("Article E", "2024-03-08T10:00:00-04:00"))
    }

    fn titles(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(Document::title).collect()
    }

    fn harvester(config: Config, fetcher: StubFetcher) -> Harvester {
        Harvester::new(config, Arc::new(fetcher)).unwrap()
    }

    #[tokio::test]
    async fn test_discovery_order_and_dedup() {
        let config = news_config(&["ai", "quantum"]);
        let fetcher = news_site(&config);
        let outcome = harvester(config, fetcher).run().await;

        assert_eq!(
            titles(&outcome.documents),
            vec!["Article A", "Article B", "Article C", "Article D", "Article E"]
        );
        assert_eq!(outcome.state, HarvestState::Done);
        assert_eq!(outcome.stats.topics, 2);
        assert_eq!(outcome.stats.links, 5);

        let hashes: HashSet<String> = outcome.documents.iter().map(Document::content_hash).collect();
        assert_eq!(hashes.len(), outcome.documents.len());
    }

    #[tokio::test]
    async fn test_harvest_matches_run() {
        let config = news_config(&["ai", "quantum"]);
        let fetcher = news_site(&config);
        let harvester = harvester(config, fetcher);

        let documents = harvester.harvest().await;
        let outcome = harvester.run().await;
        assert_eq!(titles(&documents), titles(&outcome.documents));
    }

    #[tokio::test]
    async fn test_max_count_stops_exactly() {
        let mut config = news_config(&["ai", "quantum"]);
        config.harvest.max_document_count = Some(2);
        let fetcher = news_site(&config);
        let outcome = harvester(config, fetcher).run().await;

        assert_eq!(titles(&outcome.documents), vec!["Article A", "Article B"]);
        assert_eq!(outcome.stop_reason(), Some(StopReason::MaxCountReached));
    }

    #[tokio::test]
    async fn test_max_count_larger_than_available() {
        let mut config = news_config(&["ai", "quantum"]);
        config.harvest.max_document_count = Some(50);
        let fetcher = news_site(&config);
        let outcome = harvester(config, fetcher).run().await;

        assert_eq!(outcome.documents.len(), 5);
        assert_eq!(outcome.state, HarvestState::Done);
    }

    #[tokio::test]
    async fn test_boundary_excluded_and_stops() {
        let config = news_config(&["ai", "quantum"]);
        let fetcher = news_site(&config);
        let first_pass = harvester(config.clone(), news_site(&config)).harvest().await;
        let boundary = first_pass[2].clone();

        let outcome = harvester(config, fetcher)
            .with_last_document(boundary)
            .run()
            .await;

        assert_eq!(titles(&outcome.documents), vec!["Article A", "Article B"]);
        assert_eq!(outcome.stop_reason(), Some(StopReason::BoundaryReached));
    }

    #[tokio::test]
    async fn test_boundary_first_yields_empty() {
        let config = news_config(&["ai", "quantum"]);
        let first_pass = harvester(config.clone(), news_site(&config)).harvest().await;
        let newest = first_pass[0].clone();

        let fetcher = news_site(&config);
        let outcome = harvester(config, fetcher)
            .with_last_document(newest)
            .run()
            .await;

        assert!(outcome.documents.is_empty());
        assert_eq!(outcome.stop_reason(), Some(StopReason::BoundaryReached));
    }

    #[tokio::test]
    async fn test_unrelated_boundary_never_stops() {
        let config = news_config(&["ai", "quantum"]);
        let fetcher = news_site(&config);
        let outcome = harvester(config, fetcher)
            .with_last_document(sample_document("Elsewhere", "https://www.nist.gov/x"))
            .run()
            .await;

        assert_eq!(outcome.documents.len(), 5);
        assert_eq!(outcome.state, HarvestState::Done);
    }

    #[tokio::test]
    async fn test_failed_document_is_skipped() {
        let config = news_config(&["ai", "quantum"]);
        let fetcher = news_site(&config).status(&news_url("b"), 500);
        let outcome = harvester(config, fetcher).run().await;

        assert_eq!(
            titles(&outcome.documents),
            vec!["Article A", "Article C", "Article D", "Article E"]
        );
        assert_eq!(outcome.stats.extraction_failures, 1);
        assert_eq!(outcome.state, HarvestState::Done);
    }

    #[tokio::test]
    async fn test_same_content_hash_is_skipped() {
        let config = publications_config(&["security"]);
        let pdf = "https://nvlpubs.nist.gov/nistpubs/NIST.SP.800-1.pdf";
        let (first, mirror, other) = (
            "https://www.nist.gov/publications/guide",
            "https://www.nist.gov/publications/guide-mirror",
            "https://www.nist.gov/publications/other",
        );
        let fetcher = StubFetcher::new()
            .page(
                &listing_url(&config, "security", 0),
                listing_html(&[first, mirror, other], None),
            )
            .page(first, publication_html("Guide", "2023-11-02", Some("https://doi.org/10.1/a")))
            .page(mirror, publication_html("Guide", "2023-11-02", Some("https://doi.org/10.1/b")))
            .page(other, publication_html("Other", "2023-10-01", None))
            .redirect("https://doi.org/10.1/a", pdf)
            .redirect("https://doi.org/10.1/b", pdf);

        let outcome = harvester(config, fetcher).run().await;

        assert_eq!(titles(&outcome.documents), vec!["Guide", "Other"]);
        assert_eq!(outcome.documents[0].web_link(), pdf);
        assert_eq!(outcome.stats.duplicates, 1);
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let config = news_config(&["ai", "quantum"]);
        let fetcher = news_site(&config);
        let harvester = harvester(config, fetcher);

        let first = harvester.run().await;
        let second = harvester.run().await;
        assert_eq!(first.documents.len(), 5);
        assert_eq!(second.documents.len(), 5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = news_config(&[]);
        assert!(matches!(
            Harvester::new(config.clone(), Arc::new(StubFetcher::new())),
            Err(AppError::Config(_))
        ));

        config.source.topics = vec!["ai".into()];
        config.source.start_url = "https://www.nist.gov/about".to_string();
        assert!(Harvester::new(config, Arc::new(StubFetcher::new())).is_err());
    }

    #[test]
    fn test_kind_from_config() {
        let harvester = harvester(publications_config(&["x"]), StubFetcher::new());
        assert_eq!(harvester.kind(), DocumentKind::Publications);
    }
}
