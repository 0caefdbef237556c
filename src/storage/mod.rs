//! Storage abstractions for harvested documents.
//!
//! A harvest writes one snapshot; the newest document of that snapshot is the
//! boundary for the next incremental run.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Harvester configuration
//! └── documents.json        # Latest non-empty harvest
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Document;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of documents in the written snapshot
    pub count: usize,
    /// False when the write was skipped (empty harvest)
    pub written: bool,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Contents of documents.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// ISO 8601 timestamp of the harvest
    pub harvested_at: DateTime<Utc>,
    /// Total document count
    pub count: usize,
    /// Documents, newest first as discovered
    pub documents: Vec<Document>,
}

impl DocumentSnapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            harvested_at: Utc::now(),
            count: documents.len(),
            documents,
        }
    }
}

/// Trait for document storage backends.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Persist a harvest. An empty harvest never replaces a stored one.
    async fn write_documents(&self, documents: &[Document]) -> Result<WriteMetadata>;

    /// Load the stored documents (empty when nothing was stored yet).
    async fn load_documents(&self) -> Result<Vec<Document>>;

    /// The document an incremental harvest stops at.
    async fn load_boundary(&self) -> Result<Option<Document>> {
        Ok(self.load_documents().await?.into_iter().next())
    }
}
