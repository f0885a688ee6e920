// src/models/asset_type.rs

//! Document type vocabulary and the ordered markers used to classify links.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kind of meeting document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Agenda,
    Minutes,
    Audio,
    Video,
    AgendaPacket,
    Captions,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::Agenda,
        AssetType::Minutes,
        AssetType::Audio,
        AssetType::Video,
        AssetType::AgendaPacket,
        AssetType::Captions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Agenda => "agenda",
            AssetType::Minutes => "minutes",
            AssetType::Audio => "audio",
            AssetType::Video => "video",
            AssetType::AgendaPacket => "agenda_packet",
            AssetType::Captions => "captions",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown asset type '{s}'")))
    }
}

/// A substring that, when found in a link, selects an asset type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeMarker {
    /// Case-insensitive substring to look for
    pub marker: String,

    /// Type assigned when the marker matches
    pub asset_type: AssetType,
}

impl TypeMarker {
    pub fn new(marker: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            marker: marker.into().to_lowercase(),
            asset_type,
        }
    }

    /// Built-in marker order. Specific markers come before general ones.
    pub fn defaults() -> Vec<TypeMarker> {
        vec![
            TypeMarker::new("packet", AssetType::AgendaPacket),
            TypeMarker::new("minutes", AssetType::Minutes),
            TypeMarker::new("captions", AssetType::Captions),
            TypeMarker::new("audio", AssetType::Audio),
            TypeMarker::new("video", AssetType::Video),
            TypeMarker::new("agenda", AssetType::Agenda),
        ]
    }
}

/// First marker contained in `haystack` wins.
pub fn match_marker(markers: &[TypeMarker], haystack: &str) -> Option<AssetType> {
    let haystack = haystack.to_lowercase();
    markers
        .iter()
        .find(|m| !m.marker.is_empty() && haystack.contains(&m.marker.to_lowercase()))
        .map(|m| m.asset_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        assert_eq!("agenda_packet".parse::<AssetType>().unwrap(), AssetType::AgendaPacket);
        assert_eq!(" Minutes ".parse::<AssetType>().unwrap(), AssetType::Minutes);
        assert!("transcript".parse::<AssetType>().is_err());
        assert_eq!(AssetType::AgendaPacket.to_string(), "agenda_packet");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AssetType::AgendaPacket).unwrap();
        assert_eq!(json, "\"agenda_packet\"");
    }

    #[test]
    fn specific_marker_precedes_general() {
        let markers = TypeMarker::defaults();
        assert_eq!(
            match_marker(&markers, "/AgendaCenter/ViewFile/Agenda/_01012020-1?packet=true"),
            Some(AssetType::AgendaPacket)
        );
        assert_eq!(
            match_marker(&markers, "/AgendaCenter/ViewFile/Minutes/_01012020-1"),
            Some(AssetType::Minutes)
        );
        assert_eq!(match_marker(&markers, "nothing here"), None);
    }

    #[test]
    fn order_decides_between_overlapping_markers() {
        let reversed: Vec<_> = TypeMarker::defaults().into_iter().rev().collect();
        assert_eq!(
            match_marker(&reversed, "Agenda Packet"),
            Some(AssetType::Agenda)
        );
    }
}
