//! Raw field set classified from one listing entry.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::AssetType;

/// One document link as read off a search-results page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRecord {
    /// Body that issued the document
    pub committee_name: Option<String>,

    /// Link as found in the markup, relative or absolute
    pub url_path: String,

    /// Display text of the meeting
    pub meeting_title: String,

    pub meeting_date: Option<NaiveDate>,

    /// Only set when the listing states a time
    pub meeting_time: Option<NaiveTime>,

    /// Platform-native suffix, e.g. `_11192020-808`
    pub meeting_id: String,

    pub asset_type: AssetType,
}
