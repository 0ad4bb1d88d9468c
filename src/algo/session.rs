//! Library-level state model for embedders that keep a packing list open
//! across edits: load, re-ingest, reset, and a bound filter.
//!
//! The `packlist` CLI, the MCP server and the plugin commands are stateless
//! and call `ops` per request instead.

use std::borrow::Cow;

use super::filter::{self, FilterState};
use super::parser::{self, ParseError};
use super::record::RecordSet;

/// In-memory analysis state: the source text, the full record set parsed from
/// it, and the filter currently applied on top.
///
/// Every derived view is recomputed from `(records, filter)` on demand.
#[derive(Debug, Clone, Default)]
pub struct Session {
    text: String,
    records: RecordSet,
    filter: FilterState,
}

impl Session {
    /// Initial ingestion. A failed parse still yields a session (with no
    /// records) alongside the error.
    pub fn load(text: impl Into<String>) -> (Self, Option<ParseError>) {
        let text = text.into();
        match parser::parse(&text) {
            Ok(records) => {
                tracing::info!(records = records.len(), "loaded packing list");
                (
                    Self {
                        text,
                        records,
                        filter: FilterState::none(),
                    },
                    None,
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "initial parse failed");
                (
                    Self {
                        text,
                        ..Self::default()
                    },
                    Some(e),
                )
            }
        }
    }

    /// Replace the source with new text (paste or upload). On failure the
    /// previous text, records and filter are left untouched.
    pub fn reingest(&mut self, text: impl Into<String>) -> Result<&RecordSet, ParseError> {
        let text = text.into();
        let records = parser::parse(&text).inspect_err(|e| {
            tracing::warn!(error = %e, "re-ingestion failed, keeping previous data");
        })?;
        tracing::info!(records = records.len(), "re-ingested packing list");
        self.text = text;
        self.records = records;
        self.filter.clear();
        Ok(&self.records)
    }

    /// Re-parse the current text and clear the filter.
    pub fn reset(&mut self) -> Result<&RecordSet, ParseError> {
        let text = self.text.clone();
        self.reingest(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn select_field(&mut self, field: &str) {
        self.filter.select_field(field);
    }

    pub fn select_value(&mut self, value: &str) {
        self.filter.select_value(value);
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// Candidate values for the selected field, drawn from the full set.
    pub fn filter_options(&self) -> Vec<String> {
        filter::options_for(&self.records, self.filter.field().unwrap_or(""))
    }

    /// The records visible under the current filter.
    pub fn filtered(&self) -> Cow<'_, RecordSet> {
        filter::apply_state(&self.records, &self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "customer,DeviceName\nX,D1\nX,D2\nY,D1";

    #[test]
    fn load_parses_and_clears_filter() {
        let (session, err) = Session::load(CSV);
        assert!(err.is_none());
        assert_eq!(session.records().len(), 3);
        assert_eq!(session.filter(), &FilterState::none());
    }

    #[test]
    fn failed_initial_load_is_empty() {
        let (session, err) = Session::load("   ");
        assert_eq!(err, Some(ParseError::Empty));
        assert!(session.records().is_empty());
    }

    #[test]
    fn failed_reingest_keeps_previous_state() {
        let (mut session, _) = Session::load(CSV);
        session.select_field("customer");
        session.select_value("X");
        assert!(session.reingest("").is_err());
        assert_eq!(session.records().len(), 3);
        assert_eq!(session.text(), CSV);
        assert!(session.filter().is_active());
    }

    #[test]
    fn reingest_replaces_and_resets_filter() {
        let (mut session, _) = Session::load(CSV);
        session.select_field("customer");
        session.select_value("X");
        session.reingest("a\n1").unwrap();
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.filter(), &FilterState::none());
    }

    #[test]
    fn filtered_view_tracks_selection() {
        let (mut session, _) = Session::load(CSV);
        session.select_field("customer");
        assert_eq!(session.filter_options(), vec!["X", "Y"]);
        assert_eq!(session.filtered().len(), 3);
        session.select_value("X");
        assert_eq!(session.filtered().len(), 2);
        session.select_field("DeviceName");
        assert_eq!(session.filtered().len(), 3);
    }

    #[test]
    fn reset_reparses_current_text() {
        let (mut session, _) = Session::load(CSV);
        session.select_field("customer");
        session.select_value("Y");
        assert_eq!(session.reset().unwrap().len(), 3);
        assert!(!session.filter().is_active());
        assert_eq!(session.text(), CSV);
    }
}
