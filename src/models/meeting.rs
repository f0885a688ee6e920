//! Meeting event document derived from assets sharing a meeting id.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::AssetType;

/// A document attached to a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingDocument {
    pub url: String,
    pub media_type: Option<String>,
}

/// A body taking part in a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub note: String,
}

impl Participant {
    /// The committee that convened the meeting.
    pub fn host(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "committee".to_string(),
            note: "host".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingExtras {
    pub meeting_id: String,
}

/// Structured event for one meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    pub name: Option<String>,
    pub location_name: Option<String>,

    /// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` when a time is known
    pub start_date: String,

    pub documents: BTreeMap<AssetType, MeetingDocument>,
    pub participants: Vec<Participant>,
    pub extras: MeetingExtras,
}

impl Meeting {
    pub fn new(
        meeting_id: impl Into<String>,
        name: Option<String>,
        location_name: Option<String>,
        start_date: String,
    ) -> Self {
        Self {
            name,
            location_name,
            start_date,
            documents: BTreeMap::new(),
            participants: Vec::new(),
            extras: MeetingExtras {
                meeting_id: meeting_id.into(),
            },
        }
    }

    pub fn meeting_id(&self) -> &str {
        &self.extras.meeting_id
    }

    /// Attach a document. Returns `false` when the type is already taken.
    pub fn add_document(
        &mut self,
        asset_type: AssetType,
        url: impl Into<String>,
        media_type: Option<String>,
    ) -> bool {
        if self.documents.contains_key(&asset_type) {
            return false;
        }
        self.documents.insert(
            asset_type,
            MeetingDocument {
                url: url.into(),
                media_type,
            },
        );
        true
    }

    /// Add a hosting committee unless it is already listed.
    pub fn add_host(&mut self, name: &str) {
        if !self.participants.iter().any(|p| p.name == name) {
            self.participants.push(Participant::host(name));
        }
    }
}

/// Render a meeting start as a single timestamp string.
pub fn format_start(date: NaiveDate, time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => format!("{} {}", date.format("%Y-%m-%d"), t.format("%H:%M:%S")),
        None => date.format("%Y-%m-%d").to_string(),
    }
}
