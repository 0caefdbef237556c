//! Harvested document record.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

/// Site section a harvest run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    News,
    Publications,
}

impl DocumentKind {
    /// Derive the kind from a section start URL.
    pub fn from_url(url: &str) -> Result<Self> {
        if url.contains("news-events") {
            Ok(Self::News)
        } else if url.contains("publications") {
            Ok(Self::Publications)
        } else {
            Err(AppError::config(format!(
                "cannot tell document kind from start url '{url}'"
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Publications => "publications",
        }
    }
}

/// Metadata keys carried by every document, whatever its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub tags: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
}

/// Fields pulled from a detail page, before the record is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub title: String,
    pub abstract_text: Option<String>,
    pub body_text: Option<String>,
    pub web_link: String,
    pub publication_date: DateTime<FixedOffset>,
    pub metadata: DocumentMetadata,
}

/// A normalized news or publication record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    identifier: Option<String>,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    body_text: Option<String>,
    web_link: String,
    local_link: Option<String>,
    metadata: DocumentMetadata,
    publication_date: DateTime<FixedOffset>,
    harvested_at: DateTime<Utc>,
}

impl Document {
    /// Stamp an extracted document. Identifier and local link are assigned downstream.
    pub fn new(extracted: ExtractedDocument, harvested_at: DateTime<Utc>) -> Self {
        Self {
            identifier: None,
            title: extracted.title,
            abstract_text: extracted.abstract_text,
            body_text: extracted.body_text,
            web_link: extracted.web_link,
            local_link: None,
            metadata: extracted.metadata,
            publication_date: extracted.publication_date,
            harvested_at,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body_text.as_deref()
    }

    pub fn web_link(&self) -> &str {
        &self.web_link
    }

    pub fn local_link(&self) -> Option<&str> {
        self.local_link.as_deref()
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.metadata.tags.as_deref()
    }

    pub fn authors(&self) -> Option<&[String]> {
        self.metadata.authors.as_deref()
    }

    pub fn publication_date(&self) -> DateTime<FixedOffset> {
        self.publication_date
    }

    pub fn harvested_at(&self) -> DateTime<Utc> {
        self.harvested_at
    }

    /// Stable identity of the record across runs.
    ///
    /// Covers title, link and publication date only, so re-harvesting the
    /// same item later yields the same hash.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.web_link.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.publication_date.to_rfc3339().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_extracted(title: &str, link: &str) -> ExtractedDocument {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        ExtractedDocument {
            title: title.to_string(),
            abstract_text: Some("Researchers built a better clock.".to_string()),
            body_text: Some("Full story text.".to_string()),
            web_link: link.to_string(),
            publication_date: offset.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap(),
            metadata: DocumentMetadata {
                tags: Some(vec!["Time and frequency".to_string()]),
                authors: None,
            },
        }
    }

    pub(crate) fn sample_document(title: &str, link: &str) -> Document {
        Document::new(sample_extracted(title, link), Utc::now())
    }

    #[test]
    fn test_kind_from_url() {
        assert_eq!(
            DocumentKind::from_url("https://www.nist.gov/news-events/news").unwrap(),
            DocumentKind::News
        );
        assert_eq!(
            DocumentKind::from_url("https://www.nist.gov/publications").unwrap(),
            DocumentKind::Publications
        );
        assert!(DocumentKind::from_url("https://www.nist.gov/about-nist").is_err());
    }

    #[test]
    fn test_new_leaves_downstream_fields_empty() {
        let doc = sample_document("Clock", "https://www.nist.gov/news-events/news/clock");
        assert_eq!(doc.identifier(), None);
        assert_eq!(doc.local_link(), None);
        assert_eq!(doc.title(), "Clock");
    }

    #[test]
    fn test_hash_ignores_harvest_time() {
        let extracted = sample_extracted("Clock", "https://www.nist.gov/a");
        let first = Document::new(extracted.clone(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let second = Document::new(extracted, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(first.content_hash(), second.content_hash());
        assert_eq!(first.content_hash().len(), 64);
    }

    #[test]
    fn test_hash_depends_on_identity_fields() {
        let base = sample_document("Clock", "https://www.nist.gov/a");
        let other_title = sample_document("Clocks", "https://www.nist.gov/a");
        let other_link = sample_document("Clock", "https://www.nist.gov/b");
        assert_ne!(base.content_hash(), other_title.content_hash());
        assert_ne!(base.content_hash(), other_link.content_hash());
    }

    #[test]
    fn test_json_shape() {
        let doc = sample_document("Clock", "https://www.nist.gov/a");
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["abstract"], "Researchers built a better clock.");
        assert!(value["identifier"].is_null());
        assert!(value["metadata"]["authors"].is_null());
        assert_eq!(value["publication_date"], "2024-03-12T10:00:00-04:00");

        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back.content_hash(), doc.content_hash());
    }
}
