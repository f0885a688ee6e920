//! Utility functions and helpers.

pub mod http;
pub mod mime;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the domain from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

static CIVICPLUS_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"_\d{8}-\d+").ok());

/// Extract the platform-native meeting suffix from a document link.
///
/// CivicPlus links end in `_MMDDYYYY-N`; other links fall back to the
/// trailing digits of an id-like query value or the last path segment,
/// prefixed with `_`.
pub fn extract_meeting_suffix(href: &str) -> Option<String> {
    if let Some(m) = CIVICPLUS_SUFFIX.as_ref()?.find(href) {
        return Some(m.as_str().to_string());
    }

    let base = Url::parse("http://localhost/").ok()?;
    let parsed = base.join(href).ok()?;

    for (key, value) in parsed.query_pairs() {
        let key_lower = key.to_lowercase();
        if (key_lower.contains("id") || key_lower.ends_with("no"))
            && !value.is_empty()
            && value.chars().all(|c| c.is_ascii_digit())
        {
            return Some(format!("_{value}"));
        }
    }

    let last = parsed.path_segments().and_then(|mut segments| segments.next_back())?;
    let digits: String = last.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then(|| format!("_{digits}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://Nc-NashCounty.civicplus.com/AgendaCenter"),
            Some("nc-nashcounty.civicplus.com".to_string())
        );
        assert_eq!(get_domain("not a url"), None);
    }

    #[test]
    fn test_civicplus_suffix() {
        assert_eq!(
            extract_meeting_suffix("/AgendaCenter/ViewFile/Agenda/_11192020-808?html=true"),
            Some("_11192020-808".to_string())
        );
        assert_eq!(
            extract_meeting_suffix("/AgendaCenter/ViewFile/Minutes/_05042020-381"),
            Some("_05042020-381".to_string())
        );
    }

    #[test]
    fn test_fallback_suffix() {
        assert_eq!(
            extract_meeting_suffix("/View.ashx?M=A&ID=12345&GUID=abc"),
            Some("_12345".to_string())
        );
        assert_eq!(
            extract_meeting_suffix("https://example.com/meetings/2041"),
            Some("_2041".to_string())
        );
        assert_eq!(extract_meeting_suffix("/documents/agenda"), None);
    }
}
