//! Site drivers.
//!
//! A driver owns everything platform specific: building the search URL,
//! fetching the page and turning parsed records into assets with the
//! site's place and platform id. Probing, filtering and downloading are
//! shared by every driver.

mod civic_plus;
mod download;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Asset, AssetCollection, AssetType, RawRecord, ScrapeContext};
use crate::services::ParseReport;
use crate::utils::http;

pub use civic_plus::CivicPlusSite;
pub use download::{asset_file_name, download_asset};

/// Date range of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SearchParams {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date > end_date {
            return Err(AppError::validation(format!(
                "start date {start_date} is after end date {end_date}"
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Today's meetings only.
    pub fn today() -> Self {
        let today = Local::now().date_naive();
        Self {
            start_date: today,
            end_date: today,
        }
    }
}

/// What a scrape should do beyond parsing.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub params: SearchParams,

    /// Keep only these types; `None` keeps all
    pub asset_types: Option<Vec<AssetType>>,

    /// Drop assets whose probed size exceeds this many megabytes
    pub max_file_size_mb: Option<f64>,

    /// Issue a HEAD request per asset to learn type and size
    pub probe: bool,

    /// Download kept assets into this directory
    pub download_dir: Option<PathBuf>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            params: SearchParams::today(),
            asset_types: None,
            max_file_size_mb: None,
            probe: true,
            download_dir: None,
        }
    }
}

/// Shared contract of all platform drivers.
#[async_trait]
pub trait SiteDriver: Send + Sync {
    /// Per-site context attached to every asset.
    fn context(&self) -> &ScrapeContext;

    /// Fetch one search-results page.
    async fn fetch_page(&self, params: &SearchParams) -> Result<String>;

    /// Parse a search-results page.
    fn parse_page(&self, markup: &str) -> ParseReport;

    /// Fetch, parse and post-process one search.
    async fn scrape(&self, options: &ScrapeOptions) -> Result<AssetCollection>;

    /// Parse a page and wrap every record into an asset.
    fn collect_assets(&self, markup: &str) -> AssetCollection {
        let report = self.parse_page(markup);
        build_assets(&report.records, self.context())
    }
}

/// Wrap records into assets; records without a meeting date are dropped.
pub fn build_assets(records: &[RawRecord], ctx: &ScrapeContext) -> AssetCollection {
    let mut collection = AssetCollection::new();
    for record in records {
        match Asset::from_record(record, ctx) {
            Ok(asset) => collection.append(asset),
            Err(e) => log::warn!("Dropping record {}: {}", record.url_path, e),
        }
    }
    collection
}

/// Apply the type allow-list and size limit.
pub fn filter_assets(collection: &mut AssetCollection, options: &ScrapeOptions) {
    let before = collection.len();
    if let Some(types) = &options.asset_types {
        collection.retain(|a| a.asset_type.is_some_and(|t| types.contains(&t)));
    }
    if let Some(max_mb) = options.max_file_size_mb {
        collection.retain(|a| a.size_mb().is_none_or(|mb| mb <= max_mb));
    }
    let dropped = before - collection.len();
    if dropped > 0 {
        log::info!("Filtered out {dropped} of {before} assets");
    }
}

/// Back-fill content type and length with bounded concurrency.
pub async fn probe_assets(
    client: &Client,
    collection: &mut AssetCollection,
    concurrency: usize,
    delay: Duration,
) {
    let urls: Vec<String> = collection.iter().map(|a| a.url.clone()).collect();
    let mut results = stream::iter(urls)
        .map(|url| async move {
            let result = http::probe(client, &url).await;
            (url, result)
        })
        .buffered(concurrency.max(1));

    let mut probed = Vec::with_capacity(collection.len());
    while let Some((url, result)) = results.next().await {
        match result {
            Ok(info) => probed.push(Some(info)),
            Err(error) => {
                log::warn!("Failed to probe {url}: {error}");
                probed.push(None);
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    for (asset, info) in collection.iter_mut().zip(probed) {
        if let Some((content_type, content_length)) = info {
            asset.set_content_info(content_type, content_length);
        }
    }
}

/// Indices of the assets to download.
///
/// Two assets with the same meeting id and type would share one file name;
/// only the first in collection order is kept.
pub fn claim_download_targets(collection: &AssetCollection) -> Vec<usize> {
    let mut claimed = HashSet::new();
    collection
        .iter()
        .enumerate()
        .filter_map(|(index, asset)| {
            if claimed.insert(asset_file_name(asset, None)) {
                Some(index)
            } else {
                log::info!(
                    "Skipping download of {}: same meeting and type as an earlier asset",
                    asset.url
                );
                None
            }
        })
        .collect()
}

/// Download every claimed asset, logging failures. Returns the written paths.
///
/// Content type and length learned from each response are written back to
/// the collection.
pub async fn download_assets(
    client: &Client,
    collection: &mut AssetCollection,
    target_dir: &Path,
    concurrency: usize,
    delay: Duration,
) -> Vec<PathBuf> {
    let jobs: Vec<(usize, Asset)> = claim_download_targets(collection)
        .into_iter()
        .filter_map(|index| collection.as_slice().get(index).cloned().map(|a| (index, a)))
        .collect();

    let mut downloads = stream::iter(jobs)
        .map(|(index, mut asset)| async move {
            let result = download_asset(client, &mut asset, target_dir).await;
            (index, asset, result)
        })
        .buffer_unordered(concurrency.max(1));

    let mut written = Vec::new();
    let mut learned = Vec::new();
    while let Some((index, asset, result)) = downloads.next().await {
        match result {
            Ok(path) => written.push(path),
            Err(error) => log::warn!("Failed to download {}: {}", asset.url, error),
        }
        learned.push((index, asset));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    for (index, asset) in learned {
        if let Some(slot) = collection.get_mut(index) {
            slot.set_content_info(asset.content_type, asset.content_length);
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn sized(url: &str, asset_type: AssetType, len: Option<u64>) -> Asset {
        Asset {
            asset_type: Some(asset_type),
            content_length: len,
            ..Asset::new(url)
        }
    }

    #[test]
    fn search_params_reject_inverted_range() {
        let a = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(SearchParams::new(a, b).is_err());
        assert!(SearchParams::new(b, a).is_ok());
    }

    #[test]
    fn filters_by_type_and_size() {
        let mut collection: AssetCollection = vec![
            sized("http://a/1", AssetType::Agenda, Some(1_000)),
            sized("http://a/2", AssetType::Minutes, Some(1_000)),
            sized("http://a/3", AssetType::Agenda, Some(50 * 1_048_576)),
            sized("http://a/4", AssetType::Agenda, None),
        ]
        .into();
        let options = ScrapeOptions {
            asset_types: Some(vec![AssetType::Agenda]),
            max_file_size_mb: Some(10.0),
            ..ScrapeOptions::default()
        };

        filter_assets(&mut collection, &options);
        let urls: Vec<_> = collection.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a/1", "http://a/4"]);
    }

    #[test]
    fn undated_records_are_dropped() {
        let ctx = ScrapeContext::new(
            "civicplus",
            "ca-example",
            "example",
            "ca",
            Url::parse("https://ca-example.civicplus.com/").unwrap(),
            "civic-scraper_test",
        );
        let dated = RawRecord {
            committee_name: None,
            url_path: "/AgendaCenter/ViewFile/Agenda/_01012021-1".into(),
            meeting_title: "Agenda".into(),
            meeting_date: NaiveDate::from_ymd_opt(2021, 1, 1),
            meeting_time: None,
            meeting_id: "_01012021-1".into(),
            asset_type: AssetType::Agenda,
        };
        let undated = RawRecord {
            meeting_date: None,
            ..dated.clone()
        };

        let collection = build_assets(&[undated, dated], &ctx);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn same_meeting_and_type_is_downloaded_once() {
        let with_id = |url: &str, meeting_id: &str, asset_type: AssetType| Asset {
            meeting_id: Some(meeting_id.into()),
            ..sized(url, asset_type, None)
        };
        let collection: AssetCollection = vec![
            with_id("http://a/agenda?html=true", "m1", AssetType::Agenda),
            with_id("http://a/minutes", "m1", AssetType::Minutes),
            with_id("http://a/agenda", "m1", AssetType::Agenda),
            with_id("http://a/agenda-2", "m2", AssetType::Agenda),
        ]
        .into();

        assert_eq!(claim_download_targets(&collection), vec![0, 1, 3]);
    }

    #[tokio::test]
    async fn downloading_nothing_writes_nothing() {
        let client = Client::new();
        let tmp = tempfile::TempDir::new().unwrap();
        let mut collection = AssetCollection::new();

        let written =
            download_assets(&client, &mut collection, tmp.path(), 4, Duration::ZERO).await;
        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn failed_download_leaves_asset_untouched() {
        let client = Client::new();
        let tmp = tempfile::TempDir::new().unwrap();
        let mut collection: AssetCollection =
            vec![sized("not-a-url", AssetType::Agenda, Some(10))].into();

        let written =
            download_assets(&client, &mut collection, tmp.path(), 2, Duration::ZERO).await;
        assert!(written.is_empty());
        assert_eq!(collection.as_slice()[0].content_length, Some(10));
    }

    #[tokio::test]
    async fn probing_nothing_is_a_no_op() {
        let client = Client::new();
        let mut collection = AssetCollection::new();
        probe_assets(&client, &mut collection, 4, Duration::ZERO).await;
        assert!(collection.is_empty());
    }
}
