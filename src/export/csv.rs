// src/export/csv.rs

//! Flat CSV metadata export.
//!
//! An absent value is written as an empty unquoted cell and a present but
//! empty value as `""`, so the two stay distinguishable on re-read.

use std::mem::take;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Asset, AssetCollection, AssetType};

use super::{ensure_dir, write_atomic};

/// Column order of the metadata file.
pub const HEADERS: [&str; 12] = [
    "place",
    "state_or_province",
    "meeting_date",
    "meeting_time",
    "committee_name",
    "meeting_id",
    "asset_name",
    "asset_type",
    "url",
    "scraped_by",
    "content_type",
    "content_length",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// File name for an export made at `at`, at minute resolution.
pub fn file_name(at: DateTime<Utc>) -> String {
    format!("civic_scraper_assets_meta_{}z.csv", at.format("%Y%m%dT%H%M"))
}

/// Write the collection to `<target_dir>/<file_name(at)>`.
pub fn write_csv(collection: &AssetCollection, target_dir: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
    ensure_dir(target_dir)?;
    let path = target_dir.join(file_name(at));
    write_atomic(&path, render(collection).as_bytes())?;
    log::info!("Wrote {} asset rows to {}", collection.len(), path.display());
    Ok(path)
}

/// Render header and rows.
pub fn render(collection: &AssetCollection) -> String {
    let mut out = String::new();
    let header: Vec<Option<String>> = HEADERS.iter().map(|h| Some(h.to_string())).collect();
    write_row(&mut out, &header);
    for asset in collection {
        write_row(&mut out, &to_row(asset));
    }
    out
}

fn to_row(asset: &Asset) -> Vec<Option<String>> {
    vec![
        asset.place.clone(),
        asset.state_or_province.clone(),
        asset.meeting_date.map(|d| d.format(DATE_FORMAT).to_string()),
        asset.meeting_time.map(|t| t.format(TIME_FORMAT).to_string()),
        asset.committee_name.clone(),
        asset.meeting_id.clone(),
        asset.asset_name.clone(),
        asset.asset_type.map(|t| t.to_string()),
        Some(asset.url.clone()),
        asset.scraped_by.clone(),
        asset.content_type.clone(),
        asset.content_length.map(|n| n.to_string()),
    ]
}

fn needs_quotes(field: &str) -> bool {
    field.is_empty()
        || field.contains(',')
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
}

fn write_row(out: &mut String, row: &[Option<String>]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match cell {
            None => {}
            Some(value) if needs_quotes(value) => {
                out.push('"');
                out.push_str(&value.replace('"', "\"\""));
                out.push('"');
            }
            Some(value) => out.push_str(value),
        }
    }
    out.push_str("\r\n");
}

/* ---------------- Reading ---------------- */

/// Split CSV text into rows of cells; an unquoted empty cell reads as `None`.
fn parse_rows(text: &str) -> Vec<Vec<Option<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    let finish = |field: &mut String, quoted: &mut bool| {
        let cell = if field.is_empty() && !*quoted {
            None
        } else {
            Some(take(field))
        };
        *quoted = false;
        cell
    };

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => {
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => row.push(finish(&mut field, &mut quoted)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(finish(&mut field, &mut quoted));
                if !(row.len() == 1 && row[0].is_none()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            c => field.push(c),
        }
    }

    if !field.is_empty() || quoted || !row.is_empty() {
        row.push(finish(&mut field, &mut quoted));
        rows.push(row);
    }
    rows
}

/// Parse a metadata export back into a collection.
pub fn parse(text: &str) -> Result<AssetCollection> {
    let mut rows = parse_rows(text).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| AppError::validation("CSV is empty"))?;
    let header: Vec<String> = header.into_iter().map(Option::unwrap_or_default).collect();
    if header != HEADERS {
        return Err(AppError::validation(format!(
            "Unexpected CSV header: {}",
            header.join(",")
        )));
    }

    rows.enumerate()
        .map(|(i, row)| from_row(row).map_err(|e| AppError::parse(format!("CSV row {}", i + 1), e)))
        .collect()
}

fn from_row(mut row: Vec<Option<String>>) -> Result<Asset> {
    if row.len() != HEADERS.len() {
        return Err(AppError::validation(format!(
            "expected {} columns, found {}",
            HEADERS.len(),
            row.len()
        )));
    }
    let mut next = {
        let mut cells = row.drain(..);
        move || cells.next().flatten()
    };

    let place = next();
    let state_or_province = next();
    let meeting_date = next()
        .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| AppError::DateParse(s)))
        .transpose()?;
    let meeting_time = next()
        .map(|s| NaiveTime::parse_from_str(&s, TIME_FORMAT).map_err(|_| AppError::DateParse(s)))
        .transpose()?;
    let committee_name = next();
    let meeting_id = next();
    let asset_name = next();
    let asset_type = next().map(|s| s.parse::<AssetType>()).transpose()?;
    let url = next().ok_or(AppError::MissingField("url"))?;
    let scraped_by = next();
    let content_type = next();
    let content_length = next()
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| AppError::validation(format!("bad content_length '{s}'")))
        })
        .transpose()?;

    Ok(Asset {
        url,
        asset_name,
        committee_name,
        place,
        state_or_province,
        asset_type,
        meeting_date,
        meeting_time,
        meeting_id,
        scraped_by,
        content_type,
        content_length,
    })
}
