// src/services/extract.rs

//! Detail page extraction.
//!
//! Turns one news or publication detail page into an [`ExtractedDocument`].
//! Title, date and (for news) body are required; every other field is
//! best-effort and independent of the rest.

use scraper::{ElementRef, Html};
use url::Url;

use crate::error::{AppError, Result};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::models::{CompiledSelectors, DocumentKind, DocumentMetadata, ExtractedDocument};
use crate::utils::date::parse_datetime;
use crate::utils::text::clean_non_empty;
use crate::utils::{has_suffix, resolve_url};

/// Fields read from the markup, before the doi hop.
#[derive(Debug)]
struct DetailFields {
    title: String,
    publication_date: chrono::DateTime<chrono::FixedOffset>,
    abstract_text: Option<String>,
    body_text: Option<String>,
    metadata: DocumentMetadata,
    doi_link: Option<String>,
}

/// Extracts documents of one kind from detail pages.
pub struct DocumentExtractor<'a> {
    kind: DocumentKind,
    selectors: &'a CompiledSelectors,
    fetcher: &'a dyn PageFetcher,
    artifact_suffixes: &'a [String],
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(
        kind: DocumentKind,
        selectors: &'a CompiledSelectors,
        fetcher: &'a dyn PageFetcher,
        artifact_suffixes: &'a [String],
    ) -> Self {
        Self {
            kind,
            selectors,
            fetcher,
            artifact_suffixes,
        }
    }

    /// Fetch and extract one detail page.
    pub async fn extract(&self, url: &str) -> Result<ExtractedDocument> {
        let page = self.fetcher.fetch_page(url).await?;
        let fields = self.parse_detail(&page)?;

        let web_link = match fields.doi_link.as_deref() {
            Some(doi) => self.follow_doi(url, doi).await,
            None => url.to_string(),
        };

        Ok(ExtractedDocument {
            title: fields.title,
            abstract_text: fields.abstract_text,
            body_text: fields.body_text,
            web_link,
            publication_date: fields.publication_date,
            metadata: fields.metadata,
        })
    }

    /// Resolve a doi link; the detail URL stands in only when nothing answers.
    async fn follow_doi(&self, detail_url: &str, doi: &str) -> String {
        match self.fetcher.resolve(doi).await {
            Ok(landing) => {
                if has_suffix(&landing, self.artifact_suffixes) {
                    log::debug!("doi link of {} lands on artifact {}", detail_url, landing);
                } else {
                    log::debug!("doi link of {} lands on page {}", detail_url, landing);
                }
                landing
            }
            Err(e) => {
                log::warn!(
                    "doi link {} of {} unreachable, keeping detail url: {}",
                    doi,
                    detail_url,
                    e
                );
                detail_url.to_string()
            }
        }
    }

    fn parse_detail(&self, page: &FetchedPage) -> Result<DetailFields> {
        let document = Html::parse_document(&page.html);
        let sel = self.selectors;

        let title = document
            .select(&sel.title)
            .next()
            .and_then(|el| clean_non_empty(&element_text(el)))
            .ok_or_else(|| AppError::extract(&page.url, "missing title"))?;

        let publication_date = document
            .select(&sel.date)
            .next()
            .and_then(|el| {
                el.value()
                    .attr("datetime")
                    .and_then(parse_datetime)
                    .or_else(|| parse_datetime(&element_text(el)))
            })
            .ok_or_else(|| AppError::extract(&page.url, "missing or unreadable publication date"))?;

        let metadata_tags = self.tags(&document);
        if metadata_tags.is_none() {
            log::debug!("No tags on {}", page.url);
        }

        let content = document
            .select(&sel.content)
            .next()
            .and_then(|el| clean_non_empty(&element_text(el)));

        let fields = match self.kind {
            DocumentKind::News => {
                let body_text = content
                    .ok_or_else(|| AppError::extract(&page.url, "missing body text"))?;
                DetailFields {
                    title,
                    publication_date,
                    abstract_text: document
                        .select(&sel.news_abstract)
                        .next()
                        .and_then(|el| clean_non_empty(&element_text(el))),
                    body_text: Some(body_text),
                    metadata: DocumentMetadata {
                        tags: metadata_tags,
                        authors: None,
                    },
                    doi_link: None,
                }
            }
            DocumentKind::Publications => {
                let authors: Vec<String> = document
                    .select(&sel.author)
                    .filter_map(|el| clean_non_empty(&element_text(el)))
                    .collect();
                DetailFields {
                    title,
                    publication_date,
                    abstract_text: content,
                    body_text: None,
                    metadata: DocumentMetadata {
                        tags: metadata_tags,
                        authors: (!authors.is_empty()).then_some(authors),
                    },
                    doi_link: self.doi_link(&document, page),
                }
            }
        };

        Ok(fields)
    }

    /// Anchor texts of the tags block, or the block text when it has no anchors.
    fn tags(&self, document: &Html) -> Option<Vec<String>> {
        let block = document.select(&self.selectors.tags).next()?;
        let tags: Vec<String> = block
            .select(&self.selectors.tag_item)
            .filter_map(|el| clean_non_empty(&element_text(el)))
            .collect();
        if !tags.is_empty() {
            return Some(tags);
        }
        clean_non_empty(&element_text(block)).map(|text| vec![text])
    }

    fn doi_link(&self, document: &Html, page: &FetchedPage) -> Option<String> {
        let base = Url::parse(&page.final_url)
            .or_else(|_| Url::parse(&page.url))
            .ok()?;
        document
            .select(&self.selectors.any_link)
            .find(|el| {
                element_text(*el)
                    .to_lowercase()
                    .contains(&self.selectors.doi_text)
            })
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| resolve_url(&base, href))
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}
