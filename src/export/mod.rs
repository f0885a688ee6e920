//! Export of asset collections to disk.
//!
//! - `csv`: one metadata row per asset
//! - `events`: one JSON event document per meeting
//!
//! Every file is written to a sibling `.tmp` file first and renamed into
//! place, so a failed export never leaves a complete-looking file behind.

pub mod csv;
pub mod events;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Create the target directory if absent.
fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| AppError::export(dir, e))
}

/// Write bytes atomically (write to temp, then rename).
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, path)
    })();

    written.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::export(path, e)
    })
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Make an identifier safe to use as a file name stem.
///
/// Form-encoded, so distinct ids always map to distinct stems. Ids made of
/// ASCII letters, digits, `-`, `_` and `.` are unchanged.
pub fn file_stem(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect()
}
