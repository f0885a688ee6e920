// src/pipeline/scrape.rs

//! Scrape-and-export pipeline.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::AssetCollection;
use crate::sites::{ScrapeOptions, SiteDriver};

/// Which exports to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportTargets {
    pub csv: bool,
    pub events: bool,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub asset_count: usize,
    pub meeting_count: Option<usize>,
    pub csv_path: Option<PathBuf>,
    pub events_dir: Option<PathBuf>,
}

/// Directory receiving per-meeting event documents.
pub fn events_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("events")
}

/// Directory receiving downloaded assets.
pub fn assets_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("assets")
}

/// Run one search through `driver` and export the result.
pub async fn run_scrape(
    driver: &dyn SiteDriver,
    options: &ScrapeOptions,
    output_dir: &Path,
    targets: ExportTargets,
) -> Result<(AssetCollection, ScrapeSummary)> {
    let start_time = Utc::now();
    let ctx = driver.context();
    log::info!(
        "Scraping {} ({}, {}) from {} to {}",
        ctx.site_id,
        ctx.place,
        ctx.state_or_province,
        options.params.start_date,
        options.params.end_date
    );

    let collection = driver.scrape(options).await?;
    let mut summary = export_collection(&collection, output_dir, targets)?;
    summary.start_time = start_time;
    Ok((collection, summary))
}

/// Write the requested exports for an already built collection.
pub fn export_collection(
    collection: &AssetCollection,
    output_dir: &Path,
    targets: ExportTargets,
) -> Result<ScrapeSummary> {
    let start_time = Utc::now();

    let csv_path = if targets.csv {
        Some(collection.export_csv(output_dir)?)
    } else {
        None
    };

    let (meeting_count, events_dir) = if targets.events {
        let dir = events_dir(output_dir);
        let meetings = collection.export_events(&dir)?;
        (Some(meetings.len()), Some(dir))
    } else {
        (None, None)
    };

    Ok(ScrapeSummary {
        start_time,
        end_time: Utc::now(),
        asset_count: collection.len(),
        meeting_count,
        csv_path,
        events_dir,
    })
}
