//! jobmap: job-listing ingestion pipeline
//!
//! fetch (per job title × region) → merge per-pair files → geocode → CSV

pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod geocode;
pub mod logging;
pub mod merger;
pub mod pipeline;
