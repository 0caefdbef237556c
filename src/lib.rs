// src/lib.rs

//! NIST news and publications harvester library

pub mod error;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
