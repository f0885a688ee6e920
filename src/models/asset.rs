//! Normalized, platform-agnostic document reference.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{AssetType, RawRecord};
use crate::utils::resolve_url;

/// Fixed per-scrape context attached to every asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeContext {
    /// Platform prefix of the meeting id (e.g. "civicplus")
    pub platform: String,

    /// Site identifier within the platform (e.g. "nc-nashcounty")
    pub site_id: String,

    pub place: String,
    pub state_or_province: String,

    /// Origin that relative links resolve against
    pub base_url: Url,

    /// Tool/version provenance
    pub scraped_by: String,
}

impl ScrapeContext {
    /// Build a context, normalizing jurisdiction names to lowercase.
    pub fn new(
        platform: impl Into<String>,
        site_id: impl Into<String>,
        place: &str,
        state_or_province: &str,
        base_url: Url,
        scraped_by: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            site_id: site_id.into(),
            place: normalize_place(place),
            state_or_province: state_or_province.trim().to_lowercase(),
            base_url,
            scraped_by: scraped_by.into(),
        }
    }

    /// Composite meeting key: platform, site, then the native suffix.
    pub fn meeting_id(&self, native_id: &str) -> String {
        format!("{}_{}{}", self.platform, self.site_id, native_id)
    }
}

/// Lowercase with spaces and punctuation removed, e.g. "Menlo Park" -> "menlopark".
pub fn normalize_place(place: &str) -> String {
    place
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One document reference tied to a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    /// Absolute download URI
    pub url: String,
    pub asset_name: Option<String>,
    pub committee_name: Option<String>,
    pub place: Option<String>,
    pub state_or_province: Option<String>,
    pub asset_type: Option<AssetType>,
    pub meeting_date: Option<NaiveDate>,
    pub meeting_time: Option<NaiveTime>,
    pub meeting_id: Option<String>,
    pub scraped_by: Option<String>,

    /// Known only after a probe or download
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

impl Asset {
    /// Bare asset pointing at `url`, every other field unset.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            asset_name: None,
            committee_name: None,
            place: None,
            state_or_province: None,
            asset_type: None,
            meeting_date: None,
            meeting_time: None,
            meeting_id: None,
            scraped_by: None,
            content_type: None,
            content_length: None,
        }
    }

    /// Wrap a classified record with the scrape context.
    ///
    /// Fails only when the record carries no meeting date; every other
    /// missing value degrades to `None`.
    pub fn from_record(record: &RawRecord, ctx: &ScrapeContext) -> Result<Self> {
        let meeting_date = record
            .meeting_date
            .ok_or(AppError::MissingField("meeting_date"))?;

        Ok(Self {
            url: resolve_url(&ctx.base_url, &record.url_path),
            asset_name: non_empty(&record.meeting_title),
            committee_name: record.committee_name.as_deref().and_then(non_empty),
            place: non_empty(&ctx.place),
            state_or_province: non_empty(&ctx.state_or_province),
            asset_type: Some(record.asset_type),
            meeting_date: Some(meeting_date),
            meeting_time: record.meeting_time,
            meeting_id: non_empty(&record.meeting_id).map(|id| ctx.meeting_id(&id)),
            scraped_by: non_empty(&ctx.scraped_by),
            content_type: None,
            content_length: None,
        })
    }

    /// Record what a probe or download learned about the file.
    pub fn set_content_info(&mut self, content_type: Option<String>, content_length: Option<u64>) {
        if content_type.is_some() {
            self.content_type = content_type;
        }
        if content_length.is_some() {
            self.content_length = content_length;
        }
    }

    /// Size in megabytes, when known.
    pub fn size_mb(&self) -> Option<f64> {
        self.content_length.map(|len| len as f64 / 1_048_576.0)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
