//! Service layer for the harvester.
//!
//! This module contains the business logic for:
//! - Listing traversal (`LinkCollector`)
//! - Detail page extraction (`DocumentExtractor`)
//! - Harvest control and stop conditions (`Harvester`)

mod extract;
#[cfg(test)]
pub(crate) mod fixtures;
mod harvest;
mod links;

pub use extract::DocumentExtractor;
pub use harvest::{HarvestOutcome, HarvestState, HarvestStats, Harvester, StopReason};
pub use links::{LinkCollector, ListingEntry};
