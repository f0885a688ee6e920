//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{AssetType, ListingSelectors, TypeMarker};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Listing parser settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Export settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.parser.type_markers.is_empty() {
            return Err(AppError::validation("parser.type_markers is empty"));
        }
        if let Some(m) = self.parser.type_markers.iter().find(|m| m.marker.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "parser.type_markers has an empty marker for {}",
                m.asset_type
            )));
        }
        self.parser.selectors.compile()?;
        if self.output.scraped_by.trim().is_empty() {
            return Err(AppError::validation("output.scraped_by is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent probe/download requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Listing parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Where the listing pieces live on the page
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Ordered markers, first match wins
    #[serde(default = "TypeMarker::defaults")]
    pub type_markers: Vec<TypeMarker>,

    /// Text preprocessing
    #[serde(default)]
    pub cleaning: CleaningConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            selectors: ListingSelectors::default(),
            type_markers: TypeMarker::defaults(),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl ParserConfig {
    /// Type used when no marker matches.
    pub fn fallback_type(&self) -> AssetType {
        AssetType::Agenda
    }
}

/// Text cleaning/preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CleaningConfig {
    /// Patterns to remove from titles
    #[serde(default)]
    pub title_remove_patterns: Vec<String>,

    /// Patterns to remove from committee names
    #[serde(default)]
    pub committee_remove_patterns: Vec<String>,
}

impl CleaningConfig {
    fn clean(&self, text: &str, patterns: &[String]) -> String {
        let mut result = Self::normalize_whitespace(text);
        for pattern in patterns {
            result = result.replace(pattern, "");
        }
        Self::normalize_whitespace(&result)
    }

    /// Clean a meeting title.
    pub fn clean_title(&self, text: &str) -> String {
        self.clean(text, &self.title_remove_patterns)
    }

    /// Clean a committee name.
    pub fn clean_committee(&self, text: &str) -> String {
        self.clean(text, &self.committee_remove_patterns)
    }

    fn normalize_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving CSV, event and downloaded files
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    /// Provenance string written into every asset
    #[serde(default = "defaults::scraped_by")]
    pub scraped_by: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            scraped_by: defaults::scraped_by(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn user_agent() -> String {
        format!("Mozilla/5.0 (compatible; civic-scraper/{})", env!("CARGO_PKG_VERSION"))
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }

    pub fn output_dir() -> PathBuf {
        PathBuf::from("civic_scraper_output")
    }
    pub fn scraped_by() -> String {
        format!("civic-scraper_{}", env!("CARGO_PKG_VERSION"))
    }
}
