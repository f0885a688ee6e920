// src/export/events.rs

//! Grouping of assets into meetings and per-meeting JSON export.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Asset, AssetCollection, AssetType, Meeting, format_start};

use super::{ensure_dir, file_stem, write_atomic};

/// Group assets by meeting id, in collection order.
///
/// Name, location and start come from the meeting's first agenda, or from
/// its first asset when no agenda is present. The first document of each
/// type wins; later documents of the same type are dropped. Assets without
/// a meeting id or meeting date cannot be placed and are skipped.
pub fn group_meetings(collection: &AssetCollection) -> BTreeMap<String, Meeting> {
    let mut meetings: BTreeMap<String, Meeting> = BTreeMap::new();
    let mut canonical_is_agenda: BTreeMap<String, bool> = BTreeMap::new();

    for asset in collection {
        let Some(meeting_id) = asset.meeting_id.as_deref() else {
            log::warn!("Skipping asset without meeting id: {}", asset.url);
            continue;
        };
        let Some(date) = asset.meeting_date else {
            log::warn!("Skipping asset without meeting date: {}", asset.url);
            continue;
        };
        let is_agenda = asset.asset_type == Some(AssetType::Agenda);

        let meeting = match meetings.entry(meeting_id.to_string()) {
            Entry::Vacant(slot) => {
                log::debug!("Starting meeting {meeting_id}");
                canonical_is_agenda.insert(meeting_id.to_string(), is_agenda);
                slot.insert(Meeting::new(
                    meeting_id,
                    asset.asset_name.clone(),
                    asset.place.clone(),
                    format_start(date, asset.meeting_time),
                ))
            }
            Entry::Occupied(slot) => {
                let meeting = slot.into_mut();
                let has_agenda = canonical_is_agenda.entry(meeting_id.to_string()).or_default();
                if is_agenda && !*has_agenda {
                    *has_agenda = true;
                    apply_canonical(meeting, asset, date);
                }
                meeting
            }
        };

        attach(meeting, asset);
    }

    meetings
}

fn apply_canonical(meeting: &mut Meeting, asset: &Asset, date: chrono::NaiveDate) {
    meeting.name = asset.asset_name.clone();
    meeting.location_name = asset.place.clone();
    meeting.start_date = format_start(date, asset.meeting_time);
}

fn attach(meeting: &mut Meeting, asset: &Asset) {
    let asset_type = asset.asset_type.unwrap_or(AssetType::Agenda);
    if !meeting.add_document(asset_type, asset.url.clone(), asset.content_type.clone()) {
        log::debug!(
            "Meeting {} already has a {} document, ignoring {}",
            meeting.meeting_id(),
            asset_type,
            asset.url
        );
    }
    if let Some(committee) = asset.committee_name.as_deref().filter(|c| !c.is_empty()) {
        meeting.add_host(committee);
    }
}

/// Location of a meeting's event document inside `target_dir`.
pub fn event_path(target_dir: &Path, meeting_id: &str) -> PathBuf {
    target_dir.join(format!("{}.json", file_stem(meeting_id)))
}

/// Write `<target_dir>/<meeting_id>.json` for every meeting.
pub fn write_events(collection: &AssetCollection, target_dir: &Path) -> Result<BTreeMap<String, Meeting>> {
    ensure_dir(target_dir)?;
    let meetings = group_meetings(collection);

    // Case-insensitive file systems fold stems that differ only in case.
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();
    for meeting_id in meetings.keys() {
        let stem = file_stem(meeting_id).to_lowercase();
        if let Some(other) = claimed.insert(stem, meeting_id.as_str()) {
            return Err(AppError::validation(format!(
                "meetings {other} and {meeting_id} map to the same event file"
            )));
        }
    }

    for (meeting_id, meeting) in &meetings {
        let path = event_path(target_dir, meeting_id);
        let bytes = serde_json::to_vec_pretty(meeting)?;
        write_atomic(&path, &bytes)?;
    }

    log::info!(
        "Wrote {} meeting documents to {}",
        meetings.len(),
        target_dir.display()
    );
    Ok(meetings)
}
