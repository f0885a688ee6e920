// src/error.rs

//! Unified error handling for the scraper.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// Portal answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// A listing row could not be turned into a record
    #[error("Parse error for {context}: {message}")]
    Parse { context: String, message: String },

    /// No recognizable date in a listing row
    #[error("No recognizable date in '{0}'")]
    DateParse(String),

    /// A mandatory field was absent while building an asset
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Writing export output failed
    #[error("Export to {} failed: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a row parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an export error for the given path.
    pub fn export(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Export {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error only affects a single listing row.
    pub fn is_row_local(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::DateParse(_))
    }
}
