//! Turning reference-list paragraphs into [`SourceRecord`]s.

use std::collections::BTreeSet;

use thiserror::Error;

use citecheck_core::{Author, EntryStrategy, SourceRecord, current_year};

use crate::config::ParsingConfig;

pub mod heuristic;
pub mod structural;

/// Fields recognized in one reference-list entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFields {
    pub listed_number: Option<u32>,
    pub description: Option<String>,
    pub authors: BTreeSet<Author>,
    pub year: Option<i32>,
    pub url: Option<String>,
}

/// A pattern matched an entry but one of its fields could not be converted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEntry {
    #[error("list number {0:?} is out of range")]
    ListNumber(String),
    #[error("year {0:?} is not a valid year")]
    Year(String),
}

/// Builds records from the paragraphs of a reference list, numbering accepted
/// entries densely from 1.
#[derive(Debug, Clone)]
pub struct SourceBuilder<'a> {
    strategy: EntryStrategy,
    config: &'a ParsingConfig,
    current_year: i32,
    accepted: usize,
}

impl<'a> SourceBuilder<'a> {
    pub fn new(strategy: EntryStrategy, config: &'a ParsingConfig) -> Self {
        Self {
            strategy,
            config,
            current_year: current_year(),
            accepted: 0,
        }
    }

    /// Pin the year used for future-year filtering and link-only entries.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Number of entries accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Recognize `paragraph`; on acceptance the record gets the next index.
    pub fn try_build(&mut self, paragraph: &str) -> Option<SourceRecord> {
        let text = paragraph.trim();
        if text.is_empty() {
            return None;
        }
        let fields = self.recognize(text)?;

        self.accepted += 1;
        let mut record = SourceRecord::new(self.accepted, text);
        record.listed_number = fields.listed_number;
        record.description = fields.description;
        record.authors = fields.authors;
        record.year = fields.year;
        record.url = fields.url;
        Some(record)
    }

    fn recognize(&self, text: &str) -> Option<EntryFields> {
        match self.strategy {
            EntryStrategy::Heuristic => heuristic::recognize(text, self.config, self.current_year),
            EntryStrategy::Structural => self.structural(text).flatten(),
            EntryStrategy::Combined => match self.structural(text) {
                Some(Some(fields)) => Some(fields),
                Some(None) => heuristic::recognize(text, self.config, self.current_year),
                None => None,
            },
        }
    }

    /// `None` when a pattern matched but its fields were malformed,
    /// `Some(None)` when no pattern matched.
    fn structural(&self, text: &str) -> Option<Option<EntryFields>> {
        match structural::recognize(text, self.current_year) {
            Ok(fields) => Some(fields),
            Err(e) => {
                tracing::debug!(error = %e, entry = text, "skipping malformed entry");
                None
            }
        }
    }
}
