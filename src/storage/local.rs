//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── documents.json        # Latest harvest snapshot
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Document;
use crate::storage::{DocumentSnapshot, DocumentStorage, WriteMetadata};

const SNAPSHOT_KEY: &str = "documents.json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Latest stored snapshot, or `None` when nothing has been harvested yet.
    ///
    /// A snapshot that exists but cannot be read or parsed is an error.
    pub async fn load_snapshot(&self) -> Result<Option<DocumentSnapshot>> {
        self.read_json(SNAPSHOT_KEY).await
    }

    /// Read a standalone document JSON file (a boundary given on the command line).
    pub async fn read_document(path: impl AsRef<Path>) -> Result<Document> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DocumentStorage for LocalStorage {
    async fn write_documents(&self, documents: &[Document]) -> Result<WriteMetadata> {
        let now = Utc::now();

        if documents.is_empty() {
            log::warn!(
                "Empty harvest, keeping existing {}",
                self.path(SNAPSHOT_KEY).display()
            );
            return Ok(WriteMetadata {
                count: 0,
                written: false,
                timestamp: now,
            });
        }

        let snapshot = DocumentSnapshot::new(documents.to_vec());
        self.write_json(SNAPSHOT_KEY, &snapshot).await?;
        log::info!(
            "{} documents written to {}",
            snapshot.count,
            self.path(SNAPSHOT_KEY).display()
        );

        Ok(WriteMetadata {
            count: snapshot.count,
            written: true,
            timestamp: now,
        })
    }

    async fn load_documents(&self) -> Result<Vec<Document>> {
        match self.load_snapshot().await? {
            Some(snapshot) => Ok(snapshot.documents),
            None => {
                log::warn!("No {} found", SNAPSHOT_KEY);
                Ok(Vec::new())
            }
        }
    }
}
