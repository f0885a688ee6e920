// src/services/classifier.rs

//! Record classifier.
//!
//! Turns one document link and the listing row around it into a
//! [`RawRecord`]: committee, link, title, date, optional time, native
//! meeting id and asset type.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::{AppError, Result};
use crate::models::{
    AssetType, CleaningConfig, CompiledSelectors, ParserConfig, RawRecord, TypeMarker,
    match_marker,
};
use crate::utils::extract_meeting_suffix;

static MONTH_DAY_YEAR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})\b").ok());

static NUMERIC_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").ok());

static ID_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"_(\d{8})-").ok());

static CLOCK_TIME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\b(?:\s*([ap])\.?\s?m\b)?").ok()
});

static HOUR_AFTER_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{4},?\s+(?:at\s+)?(\d{1,2})\s*([ap])\.?\s?m\b").ok()
});

/// Classifies listing entries into raw records.
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    selectors: CompiledSelectors,
    markers: Vec<TypeMarker>,
    fallback: AssetType,
    cleaning: CleaningConfig,
}

impl RecordClassifier {
    /// Build a classifier, compiling the configured selectors.
    pub fn new(config: &ParserConfig) -> Result<Self> {
        Ok(Self {
            selectors: config.selectors.compile()?,
            markers: config.type_markers.clone(),
            fallback: config.fallback_type(),
            cleaning: config.cleaning.clone(),
        })
    }

    pub(crate) fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }

    pub(crate) fn clean_committee(&self, text: &str) -> Option<String> {
        let name = self.cleaning.clean_committee(text);
        (!name.is_empty()).then_some(name)
    }

    /// Classify a standalone fragment holding one listing row.
    ///
    /// The first document link inside the row is classified. A committee
    /// heading inside the fragment, if any, names the committee.
    pub fn classify(&self, row_markup: &str) -> Result<RawRecord> {
        let mut fragment = Html::parse_fragment(row_markup);
        if fragment.select(&self.selectors.row).next().is_none() {
            // Bare table rows are dropped by the HTML parser outside a table.
            let wrapped = Html::parse_fragment(&format!("<table>{row_markup}</table>"));
            if wrapped.select(&self.selectors.row).next().is_some() {
                fragment = wrapped;
            }
        }

        let committee = fragment
            .select(&self.selectors.committee)
            .next()
            .and_then(|h| self.clean_committee(&h.text().collect::<String>()));

        let row = fragment
            .select(&self.selectors.row)
            .next()
            .unwrap_or_else(|| fragment.root_element());
        let link = row
            .select(&self.selectors.link)
            .next()
            .ok_or_else(|| AppError::parse("listing row", "no document link"))?;

        self.classify_entry(committee.as_deref(), row, link)
    }

    /// Classify one document link within its row.
    pub fn classify_entry(
        &self,
        committee: Option<&str>,
        row: ElementRef<'_>,
        link: ElementRef<'_>,
    ) -> Result<RawRecord> {
        let url_path = link
            .value()
            .attr(&self.selectors.attr_name)
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or_else(|| AppError::parse("document link", "missing href"))?
            .to_string();

        let meeting_id = extract_meeting_suffix(&url_path)
            .ok_or_else(|| AppError::parse(url_path.clone(), "no meeting id in link"))?;

        let link_text = self.cleaning.clean_title(&link.text().collect::<String>());
        let meeting_title = row
            .select(&self.selectors.title)
            .next()
            .map(|el| self.cleaning.clean_title(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| link_text.clone());

        let date_text = row
            .select(&self.selectors.date)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        let meeting_date = parse_date_text(&date_text)
            .or_else(|| parse_date_text(&meeting_title))
            .or_else(|| date_from_id(&url_path))
            .ok_or_else(|| AppError::DateParse(format!("{meeting_title} ({url_path})")))?;

        let time_text = row
            .select(&self.selectors.time)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let meeting_time =
            parse_time_text(&time_text).or_else(|| parse_time_text(&meeting_title));

        let asset_type = match_marker(&self.markers, &url_path)
            .or_else(|| match_marker(&self.markers, &link_text))
            .unwrap_or(self.fallback);

        Ok(RawRecord {
            committee_name: committee.map(str::to_string),
            url_path,
            meeting_title,
            meeting_date: Some(meeting_date),
            meeting_time,
            meeting_id,
            asset_type,
        })
    }
}

/// Find a `Month D, YYYY` or `M/D/YYYY` date anywhere in `text`.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    for caps in MONTH_DAY_YEAR.as_ref()?.captures_iter(text) {
        let candidate = format!("{} {} {}", &caps[1], &caps[2], &caps[3]);
        let parsed = NaiveDate::parse_from_str(&candidate, "%B %d %Y")
            .or_else(|_| NaiveDate::parse_from_str(&candidate, "%b %d %Y"));
        if let Ok(date) = parsed {
            return Some(date);
        }
    }

    let caps = NUMERIC_DATE.as_ref()?.captures(text)?;
    NaiveDate::from_ymd_opt(
        caps[3].parse().ok()?,
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
    )
}

/// Date encoded in a CivicPlus `_MMDDYYYY-N` link suffix.
fn date_from_id(href: &str) -> Option<NaiveDate> {
    let caps = ID_DATE.as_ref()?.captures(href)?;
    NaiveDate::parse_from_str(&caps[1], "%m%d%Y").ok()
}

/// Find an explicit clock time: `7:30 PM`, `19:30`, or a bare hour such as
/// `7 p.m.` directly after a date's year.
pub fn parse_time_text(text: &str) -> Option<NaiveTime> {
    if let Some(caps) = CLOCK_TIME.as_ref()?.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return match caps.get(3) {
            Some(meridiem) => to_24h(hour, minute, meridiem.as_str()),
            None => NaiveTime::from_hms_opt(hour, minute, 0),
        };
    }

    let caps = HOUR_AFTER_DATE.as_ref()?.captures(text)?;
    to_24h(caps[1].parse().ok()?, 0, &caps[2])
}

fn to_24h(hour: u32, minute: u32, meridiem: &str) -> Option<NaiveTime> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = meridiem.eq_ignore_ascii_case("p");
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}
