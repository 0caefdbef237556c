// src/models/selectors.rs

//! CSS selectors for scraping listing and detail pages.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for scraping the source site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSelectors {
    /// Selector for each teaser on a listing page
    #[serde(default = "defaults::teaser")]
    pub teaser: String,

    /// Selector for the teaser link, within a teaser
    #[serde(default = "defaults::teaser_link")]
    pub teaser_link: String,

    /// Selector for the teaser date, within a teaser
    #[serde(default = "defaults::date")]
    pub teaser_date: String,

    /// Selector for the "last page" pager link
    #[serde(default = "defaults::pager_last")]
    pub pager_last: String,

    /// Selector for the detail page heading
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Selector for the detail page date
    #[serde(default = "defaults::date")]
    pub date: String,

    /// Selector for the tags block
    #[serde(default = "defaults::tags")]
    pub tags: String,

    /// Selector for the news introductory heading
    #[serde(default = "defaults::news_abstract")]
    pub news_abstract: String,

    /// Selector for the main content block (news body, publication summary)
    #[serde(default = "defaults::content")]
    pub content: String,

    /// Selector for publication authors
    #[serde(default = "defaults::author")]
    pub author: String,

    /// Link text marking the doi hop (case-insensitive)
    #[serde(default = "defaults::doi_text")]
    pub doi_text: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            teaser: defaults::teaser(),
            teaser_link: defaults::teaser_link(),
            teaser_date: defaults::date(),
            pager_last: defaults::pager_last(),
            title: defaults::title(),
            date: defaults::date(),
            tags: defaults::tags(),
            news_abstract: defaults::news_abstract(),
            content: defaults::content(),
            author: defaults::author(),
            doi_text: defaults::doi_text(),
        }
    }
}

impl SiteSelectors {
    /// Parse every selector once.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            teaser: parse_selector(&self.teaser)?,
            teaser_link: parse_selector(&self.teaser_link)?,
            teaser_date: parse_selector(&self.teaser_date)?,
            pager_last: parse_selector(&self.pager_last)?,
            title: parse_selector(&self.title)?,
            date: parse_selector(&self.date)?,
            tags: parse_selector(&self.tags)?,
            tag_item: parse_selector("a")?,
            news_abstract: parse_selector(&self.news_abstract)?,
            content: parse_selector(&self.content)?,
            author: parse_selector(&self.author)?,
            any_link: parse_selector("a[href]")?,
            doi_text: self.doi_text.to_lowercase(),
        })
    }
}

/// Parsed selectors, ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub teaser: Selector,
    pub teaser_link: Selector,
    pub teaser_date: Selector,
    pub pager_last: Selector,
    pub title: Selector,
    pub date: Selector,
    pub tags: Selector,
    pub tag_item: Selector,
    pub news_abstract: Selector,
    pub content: Selector,
    pub author: Selector,
    pub any_link: Selector,
    pub doi_text: String,
}

/// Parse a CSS selector, mapping failures to a configuration-time error.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn teaser() -> String {
        ".nist-teaser".into()
    }
    pub fn teaser_link() -> String {
        "a[href]".into()
    }
    pub fn date() -> String {
        "time".into()
    }
    pub fn pager_last() -> String {
        "li.pager__item--last a".into()
    }
    pub fn title() -> String {
        ".nist-page__title".into()
    }
    pub fn tags() -> String {
        ".nist-tags".into()
    }
    pub fn news_abstract() -> String {
        "[class*=\"nist-block\"] > h3".into()
    }
    pub fn content() -> String {
        ".text-with-summary".into()
    }
    pub fn author() -> String {
        ".nist-author".into()
    }
    pub fn doi_text() -> String {
        "doi".into()
    }
}
