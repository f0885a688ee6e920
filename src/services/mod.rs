//! Service layer for the scraper.
//!
//! This module contains the parsing logic:
//! - Listing entry classification (`RecordClassifier`)
//! - Search-results page parsing (`PageParser`)

mod classifier;
mod page_parser;

pub use classifier::{RecordClassifier, parse_date_text, parse_time_text};
pub use page_parser::{PageParser, ParseReport, RowFailure};
