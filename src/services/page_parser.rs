// src/services/page_parser.rs

//! Search-results page parser.
//!
//! Walks every committee listing, every meeting row inside it and every
//! document link inside the row, in document order, and classifies each
//! link. A row that cannot be classified is logged and skipped.

use scraper::{ElementRef, Html};

use crate::error::{AppError, Result};
use crate::models::{ParserConfig, RawRecord};
use crate::services::RecordClassifier;

/// A listing entry that could not be classified.
#[derive(Debug)]
pub struct RowFailure {
    /// Zero-based position of the entry on the page
    pub index: usize,
    pub href: Option<String>,
    pub error: AppError,
}

/// Records and failures from one page.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub records: Vec<RawRecord>,
    pub failures: Vec<RowFailure>,
}

impl ParseReport {
    /// Number of listing entries seen on the page.
    pub fn entry_count(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Parses whole search-results pages into raw records.
#[derive(Debug, Clone)]
pub struct PageParser {
    classifier: RecordClassifier,
}

impl PageParser {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        Ok(Self {
            classifier: RecordClassifier::new(config)?,
        })
    }

    /// Parser for CivicPlus AgendaCenter search results.
    pub fn civic_plus() -> Result<Self> {
        Self::new(&ParserConfig::default())
    }

    pub fn classifier(&self) -> &RecordClassifier {
        &self.classifier
    }

    /// Records in page order. A page without listing rows yields none.
    pub fn parse(&self, page_markup: &str) -> Vec<RawRecord> {
        self.parse_report(page_markup).records
    }

    /// Records in page order together with the entries that failed.
    pub fn parse_report(&self, page_markup: &str) -> ParseReport {
        let document = Html::parse_document(page_markup);
        let selectors = self.classifier.selectors();
        let mut report = ParseReport::default();

        let listings: Vec<ElementRef<'_>> = document.select(&selectors.listing).collect();
        if listings.is_empty() {
            // No committee blocks; treat the whole page as one anonymous listing.
            self.parse_rows(document.root_element(), None, &mut report);
        } else {
            for listing in listings {
                let committee = listing
                    .select(&selectors.committee)
                    .next()
                    .and_then(|h| self.classifier.clean_committee(&h.text().collect::<String>()));
                self.parse_rows(listing, committee.as_deref(), &mut report);
            }
        }

        log::debug!(
            "Parsed {} records ({} skipped) from page",
            report.records.len(),
            report.failures.len()
        );
        report
    }

    fn parse_rows(&self, scope: ElementRef<'_>, committee: Option<&str>, report: &mut ParseReport) {
        let selectors = self.classifier.selectors();
        for row in scope.select(&selectors.row) {
            for link in row.select(&selectors.link) {
                let index = report.entry_count();
                match self.classifier.classify_entry(committee, row, link) {
                    Ok(record) => report.records.push(record),
                    Err(error) => {
                        let href = link.value().attr(&selectors.attr_name).map(str::to_string);
                        let level = if error.is_row_local() {
                            log::Level::Warn
                        } else {
                            log::Level::Error
                        };
                        log::log!(
                            level,
                            "Skipping listing entry {} ({}) in {}: {}",
                            index,
                            href.as_deref().unwrap_or("no href"),
                            committee.unwrap_or("unnamed listing"),
                            error
                        );
                        report.failures.push(RowFailure { index, href, error });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetType;

    fn parser() -> PageParser {
        PageParser::civic_plus().unwrap()
    }

    const PAGE: &str = r#"
    <html><body>
      <div class="listing">
        <h2>City Council</h2>
        <table>
          <tr class="catAgendaRow">
            <td>
              <h3><strong>Feb 2, 2021</strong></h3>
              <p><a href="/AgendaCenter/ViewFile/Agenda/_02022021-10?html=true">City Council Agenda for February 2, 2021</a></p>
            </td>
            <td class="minutes"><a href="/AgendaCenter/ViewFile/Minutes/_02022021-10">Minutes</a></td>
            <td class="downloads"><a href="/AgendaCenter/ViewFile/Agenda/_02022021-10?packet=true">Agenda Packet</a></td>
          </tr>
          <tr class="catAgendaRow">
            <td>
              <h3><strong>TBD</strong></h3>
              <p><a href="/AgendaCenter/ViewFile/Agenda/draft">Draft Agenda</a></p>
            </td>
          </tr>
        </table>
      </div>
    </body></html>"#;

    #[test]
    fn keeps_source_order_within_row() {
        let records = parser().parse(PAGE);
        let types: Vec<_> = records.iter().map(|r| r.asset_type).collect();
        assert_eq!(
            types,
            vec![AssetType::Agenda, AssetType::Minutes, AssetType::AgendaPacket]
        );
        assert!(records.iter().all(|r| r.committee_name.as_deref() == Some("City Council")));
        assert!(records.iter().all(|r| r.meeting_id == "_02022021-10"));
        assert!(records
            .iter()
            .all(|r| r.meeting_title == "City Council Agenda for February 2, 2021"));
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let report = parser().parse_report(PAGE);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.entry_count(), 4);
        assert_eq!(report.failures[0].index, 3);
        assert_eq!(
            report.failures[0].href.as_deref(),
            Some("/AgendaCenter/ViewFile/Agenda/draft")
        );
    }

    #[test]
    fn empty_page_yields_no_records() {
        assert!(parser().parse("<html><body><p>No results</p></body></html>").is_empty());
        assert!(parser().parse("").is_empty());
    }

    #[test]
    fn rows_without_listing_blocks_are_found() {
        let page = r#"<table><tr class="catAgendaRow"><td>
            <h3><strong>Mar 1, 2021</strong></h3>
            <a href="/AgendaCenter/ViewFile/Minutes/_03012021-5">Minutes</a>
        </td></tr></table>"#;
        let records = parser().parse(page);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].committee_name, None);
    }
}
