// src/models/mod.rs

//! Domain models for the harvester.
//!
//! Configuration, selectors, and the document record produced by a harvest.

mod config;
mod document;
mod selectors;
mod topic;

// Re-export all public types
pub use config::{Config, CrawlerConfig, FetchStrategy, HarvestConfig, SourceConfig};
pub use document::{Document, DocumentKind, DocumentMetadata, ExtractedDocument};
pub use selectors::{CompiledSelectors, SiteSelectors};
pub use topic::Topic;

#[cfg(test)]
pub(crate) use document::tests::sample_document;
