//! Pipeline entry points.
//!
//! - `run_scrape`: fetch one search through a site driver and export it
//! - `export_collection`: write CSV and/or event documents for a collection

pub mod scrape;

pub use scrape::{ExportTargets, ScrapeSummary, export_collection, run_scrape};
