// src/lib.rs

//! civic-scraper library
//!
//! Harvests meeting-document metadata from municipal portals, groups it by
//! meeting and exports CSV metadata or per-meeting event documents.

pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sites;
pub mod utils;
