// src/pipeline/harvest.rs

//! Harvest pipeline: crawl, then persist.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::models::{Config, Document};
use crate::services::{HarvestOutcome, Harvester};
use crate::storage::DocumentStorage;

/// Run one harvest and store its documents.
///
/// `boundary` is the newest document of a previous run; the harvest stops
/// when it reaches it again.
pub async fn run_harvest(
    config: Config,
    storage: &dyn DocumentStorage,
    fetcher: Arc<dyn PageFetcher>,
    boundary: Option<Document>,
) -> Result<HarvestOutcome> {
    let start_time = Utc::now();

    let mut harvester = Harvester::new(config, fetcher)?;
    log::info!(
        "Harvesting {} from {} topic(s)",
        harvester.kind().as_str(),
        harvester.config().source.topics.len()
    );

    if let Some(document) = boundary {
        log::info!(
            "Incremental run, stopping at '{}' ({})",
            document.title(),
            document.publication_date().to_rfc3339()
        );
        harvester = harvester.with_last_document(document);
    }

    let outcome = harvester.run().await;
    let summary = storage.write_documents(&outcome.documents).await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Harvest finished in {}s: {} document(s), {} link(s), {} failure(s), {} duplicate(s)",
        elapsed.num_seconds(),
        outcome.documents.len(),
        outcome.stats.links,
        outcome.stats.extraction_failures,
        outcome.stats.duplicates
    );
    if let Some(reason) = outcome.stop_reason() {
        log::info!("Stopped early: {}", reason);
    }
    if summary.written {
        log::info!("Snapshot timestamp: {}", summary.timestamp);
    }

    Ok(outcome)
}
