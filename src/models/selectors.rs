// src/models/selectors.rs

//! CSS selectors for locating meeting documents on a search-results page.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for scraping a portal's search-results listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingSelectors {
    /// Selector for each committee block on the page
    #[serde(default = "defaults::listing")]
    pub listing_selector: String,

    /// Selector for the committee name within a listing block
    #[serde(default = "defaults::committee")]
    pub committee_selector: String,

    /// Selector for each meeting row within a listing block
    #[serde(default = "defaults::row")]
    pub row_selector: String,

    /// Selector for each document link within a meeting row
    #[serde(default = "defaults::link")]
    pub link_selector: String,

    /// Selector for the meeting title within a row
    #[serde(default = "defaults::title")]
    pub title_selector: String,

    /// Selector for the date element within a row
    #[serde(default = "defaults::date")]
    pub date_selector: String,

    /// Selector for the element that may state the meeting time
    #[serde(default = "defaults::time")]
    pub time_selector: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "defaults::attr_name")]
    pub attr_name: String,
}

impl Default for ListingSelectors {
    /// CivicPlus AgendaCenter search results.
    fn default() -> Self {
        Self {
            listing_selector: defaults::listing(),
            committee_selector: defaults::committee(),
            row_selector: defaults::row(),
            link_selector: defaults::link(),
            title_selector: defaults::title(),
            date_selector: defaults::date(),
            time_selector: defaults::time(),
            attr_name: defaults::attr_name(),
        }
    }
}

impl ListingSelectors {
    /// Parse every selector, reporting the first one that is invalid.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            listing: parse_selector(&self.listing_selector)?,
            committee: parse_selector(&self.committee_selector)?,
            row: parse_selector(&self.row_selector)?,
            link: parse_selector(&self.link_selector)?,
            title: parse_selector(&self.title_selector)?,
            date: parse_selector(&self.date_selector)?,
            time: parse_selector(&self.time_selector)?,
            attr_name: self.attr_name.clone(),
        })
    }
}

/// Parsed form of [`ListingSelectors`].
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub listing: Selector,
    pub committee: Selector,
    pub row: Selector,
    pub link: Selector,
    pub title: Selector,
    pub date: Selector,
    pub time: Selector,
    pub attr_name: String,
}

pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn listing() -> String {
        "div.listing".into()
    }
    pub fn committee() -> String {
        "h2".into()
    }
    pub fn row() -> String {
        "tr.catAgendaRow".into()
    }
    pub fn link() -> String {
        "a[href*=\"/ViewFile/\"]".into()
    }
    pub fn title() -> String {
        "p".into()
    }
    pub fn date() -> String {
        "h3 strong".into()
    }
    pub fn time() -> String {
        "h3".into()
    }
    pub fn attr_name() -> String {
        "href".into()
    }
}
