// src/sites/download.rs

//! Asset download.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::export::{file_stem, tmp_path};
use crate::models::{Asset, AssetType};
use crate::utils::{http, mime};

/// `<meeting_id>_<asset_type><ext>`, extension from the media type.
pub fn asset_file_name(asset: &Asset, content_type: Option<&str>) -> String {
    let meeting_id = asset.meeting_id.as_deref().unwrap_or("unknown");
    let asset_type = asset.asset_type.unwrap_or(AssetType::Agenda);
    let ext = content_type.and_then(mime::extension_for).unwrap_or("");
    format!("{}_{}{}", file_stem(meeting_id), asset_type, ext)
}

/// Fetch `asset.url` into `target_dir` and return the written path.
///
/// The response's declared type and size are stored on the asset. The body
/// goes to a sibling `.tmp` file first and is renamed into place.
pub async fn download_asset(client: &Client, asset: &mut Asset, target_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(target_dir)
        .await
        .map_err(|e| AppError::export(target_dir, e))?;

    let response = http::check_status(&asset.url, client.get(&asset.url).send().await?)?;
    let (content_type, content_length) = http::content_info(&response);
    let body = response.bytes().await?;

    asset.set_content_info(content_type, content_length.or(Some(body.len() as u64)));

    let path = target_dir.join(asset_file_name(asset, asset.content_type.as_deref()));
    write_file(&path, &body).await?;

    log::debug!("Downloaded {} to {}", asset.url, path.display());
    Ok(path)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let written: std::io::Result<()> = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(AppError::export(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn written_file_replaces_previous_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("m1_agenda.pdf");
        write_file(&path, b"first, longer body").await.unwrap();
        write_file(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn write_into_missing_dir_is_export_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("m1_agenda.pdf");
        let err = write_file(&path, b"body").await.unwrap_err();

        assert!(matches!(err, AppError::Export { .. }));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn file_name_uses_meeting_id_and_type() {
        let asset = Asset {
            meeting_id: Some("civicplus_nc-nashcounty_05042020-381".into()),
            asset_type: Some(AssetType::Minutes),
            ..Asset::new("http://example.com/x")
        };
        assert_eq!(
            asset_file_name(&asset, Some("application/pdf")),
            "civicplus_nc-nashcounty_05042020-381_minutes.pdf"
        );
        assert_eq!(
            asset_file_name(&asset, Some("application/x-unknown")),
            "civicplus_nc-nashcounty_05042020-381_minutes"
        );
    }
}
