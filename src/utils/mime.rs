//! Media type to file extension mapping for downloads.

/// File extension (with leading dot) for a `Content-Type` header value.
///
/// Parameters such as `; charset=utf-8` are ignored. Unknown types yield
/// `None`.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let ext = match essence.as_str() {
        "application/pdf" => ".pdf",
        "text/html" => ".html",
        "text/plain" => ".txt",
        "text/csv" => ".csv",
        "application/msword" => ".doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "application/vnd.ms-excel" => ".xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => ".xlsx",
        "application/vnd.ms-powerpoint" => ".ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => ".pptx",
        "application/zip" => ".zip",
        "audio/mpeg" => ".mp3",
        "audio/mp4" => ".m4a",
        "video/mp4" => ".mp4",
        "text/vtt" => ".vtt",
        "application/x-subrip" => ".srt",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        _ => return None,
    };
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types() {
        assert_eq!(extension_for("application/pdf"), Some(".pdf"));
        assert_eq!(extension_for("text/html; charset=utf-8"), Some(".html"));
        assert_eq!(extension_for("Video/MP4"), Some(".mp4"));
    }

    #[test]
    fn unknown_type() {
        assert_eq!(extension_for("application/x-unknown"), None);
        assert_eq!(extension_for(""), None);
    }
}
