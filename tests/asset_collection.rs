//! CSV and event exports of an asset collection.

use std::fs;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use civic_scraper::error::AppError;
use civic_scraper::export::events::event_path;
use civic_scraper::models::{Asset, AssetCollection, AssetType, Meeting};
use tempfile::TempDir;

fn asset(meeting_id: &str, asset_type: AssetType, url: &str) -> Asset {
    Asset {
        asset_name: Some("City Council Regular Meeting".into()),
        committee_name: Some("City Council".into()),
        place: Some("nashcounty".into()),
        state_or_province: Some("nc".into()),
        asset_type: Some(asset_type),
        meeting_date: NaiveDate::from_ymd_opt(2020, 5, 4),
        meeting_id: Some(meeting_id.into()),
        scraped_by: Some("civic-scraper_0.1.0".into()),
        ..Asset::new(url)
    }
}

fn sample() -> AssetCollection {
    let mut minutes = asset(
        "civicplus_nc-nashcounty_05042020-381",
        AssetType::Minutes,
        "https://nc-nashcounty.civicplus.com/AgendaCenter/ViewFile/Minutes/_05042020-381",
    );
    minutes.asset_name = Some("Minutes, \"approved\"".into());
    minutes.content_type = Some("application/pdf".into());
    minutes.content_length = Some(52_364);

    let mut agenda = asset(
        "civicplus_nc-nashcounty_05042020-381",
        AssetType::Agenda,
        "https://nc-nashcounty.civicplus.com/AgendaCenter/ViewFile/Agenda/_05042020-381",
    );
    agenda.meeting_time = NaiveTime::from_hms_opt(19, 0, 0);

    let mut packet = asset(
        "civicplus_nc-nashcounty_05182020-390",
        AssetType::AgendaPacket,
        "https://nc-nashcounty.civicplus.com/AgendaCenter/ViewFile/Agenda/_05182020-390?packet=true",
    );
    packet.meeting_date = NaiveDate::from_ymd_opt(2020, 5, 18);
    packet.committee_name = Some(String::new());

    vec![minutes, agenda, packet].into()
}

#[test]
fn csv_export_is_deterministic() {
    let at = Utc.with_ymd_and_hms(2020, 11, 19, 14, 30, 12).unwrap();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let a = sample().export_csv_at(first.path(), at).unwrap();
    let b = sample().export_csv_at(second.path(), at).unwrap();

    assert_eq!(
        a.file_name().unwrap(),
        "civic_scraper_assets_meta_20201119T1430z.csv"
    );
    assert_eq!(a.file_name(), b.file_name());
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn csv_export_creates_missing_directory() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("nested").join("out");
    let path = sample().export_csv(&target).unwrap();

    assert!(path.starts_with(&target));
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(
            "place,state_or_province,meeting_date,meeting_time,committee_name,meeting_id,\
             asset_name,asset_type,url,scraped_by,content_type,content_length"
        )
    );
    assert_eq!(lines.count(), 3);
}

#[test]
fn csv_reads_back_absent_and_empty_values() {
    let original = sample();
    let text = original.to_csv_string();
    let restored = AssetCollection::from_csv_str(&text).unwrap();

    assert_eq!(restored, original);
    let packet = &restored.as_slice()[2];
    assert_eq!(packet.committee_name.as_deref(), Some(""));
    assert_eq!(packet.meeting_time, None);
    assert_eq!(packet.content_length, None);
}

#[test]
fn csv_with_foreign_header_is_rejected() {
    let err = AssetCollection::from_csv_str("url,name\r\nhttp://x,y\r\n").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn events_group_by_meeting() {
    let tmp = TempDir::new().unwrap();
    let mut collection = sample();
    collection.append(asset(
        "civicplus_nc-nashcounty_05042020-381",
        AssetType::Agenda,
        "https://nc-nashcounty.civicplus.com/AgendaCenter/ViewFile/Agenda/_05042020-381?html=true",
    ));

    let meetings = collection.export_events(tmp.path()).unwrap();
    assert_eq!(meetings.len(), 2);

    let path = event_path(tmp.path(), "civicplus_nc-nashcounty_05042020-381");
    assert_eq!(path, tmp.path().join("civicplus_nc-nashcounty_05042020-381.json"));
    let meeting: Meeting = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();

    assert_eq!(meeting.start_date, "2020-05-04 19:00:00");
    assert_eq!(meeting.name.as_deref(), Some("City Council Regular Meeting"));
    assert_eq!(meeting.location_name.as_deref(), Some("nashcounty"));
    assert_eq!(meeting.documents.len(), 2);
    assert_eq!(
        meeting.documents[&AssetType::Agenda].url,
        "https://nc-nashcounty.civicplus.com/AgendaCenter/ViewFile/Agenda/_05042020-381"
    );
    assert_eq!(
        meeting.documents[&AssetType::Minutes].media_type.as_deref(),
        Some("application/pdf")
    );
    assert_eq!(meeting.participants.len(), 1);
    assert_eq!(meeting.participants[0].name, "City Council");
    assert_eq!(meeting.extras.meeting_id, "civicplus_nc-nashcounty_05042020-381");
    assert_eq!(meeting, meetings["civicplus_nc-nashcounty_05042020-381"]);
}

#[test]
fn event_json_uses_snake_case_document_keys() {
    let tmp = TempDir::new().unwrap();
    sample().export_events(tmp.path()).unwrap();

    let raw = fs::read_to_string(
        tmp.path()
            .join("civicplus_nc-nashcounty_05182020-390.json"),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["start_date"], "2020-05-18");
    assert!(value["documents"]["agenda_packet"]["url"].is_string());
    assert_eq!(value["documents"]["agenda_packet"]["media_type"], serde_json::Value::Null);
    assert_eq!(value["participants"], serde_json::json!([]));
    assert_eq!(value["extras"]["meeting_id"], "civicplus_nc-nashcounty_05182020-390");

    let raw = fs::read_to_string(
        tmp.path()
            .join("civicplus_nc-nashcounty_05042020-381.json"),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["participants"][0]["type"], "committee");
    assert_eq!(value["participants"][0]["note"], "host");
}

#[test]
fn export_into_a_file_path_fails() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("taken");
    fs::write(&blocker, b"x").unwrap();

    let err = sample().export_csv(&blocker).unwrap_err();
    assert!(matches!(err, AppError::Export { .. }));
}
