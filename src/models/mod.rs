// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod asset;
mod asset_type;
mod collection;
mod config;
mod meeting;
mod record;
mod selectors;

// Re-export all public types
pub use asset::{Asset, ScrapeContext, normalize_place};
pub use asset_type::{AssetType, TypeMarker, match_marker};
pub use collection::AssetCollection;
pub use config::{CleaningConfig, Config, HttpConfig, OutputConfig, ParserConfig};
pub use meeting::{Meeting, MeetingDocument, MeetingExtras, Participant, format_start};
pub use record::RawRecord;
pub use selectors::{CompiledSelectors, ListingSelectors, parse_selector};
