//! Pipeline entry points for harvester operations.
//!
//! - `run_harvest`: Crawl one site section and persist the documents

pub mod harvest;

pub use harvest::run_harvest;
