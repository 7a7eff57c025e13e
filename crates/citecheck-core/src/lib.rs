use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod authors;
pub mod backend;
pub mod config_file;
pub mod matching;
pub mod year;

// Re-export for convenience
pub use authors::{Author, find_author_fragments, parse_authors};
pub use backend::{BackendError, DocumentBackend};
pub use matching::{CitationMatcher, cited_indices};
pub use year::{current_year, extract_year, extract_year_with_current_year};

/// One entry of a document's reference list.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRecord {
    /// 1-based position among the accepted entries of the reference list.
    pub index: usize,
    /// The number the entry was printed with, when the entry carried one.
    pub listed_number: Option<u32>,
    /// Verbatim paragraph text.
    pub raw_text: String,
    /// Title/description part, when a structural pattern isolated it.
    pub description: Option<String>,
    pub authors: BTreeSet<Author>,
    pub year: Option<i32>,
    /// External link (web resources).
    pub url: Option<String>,
    /// Body paragraphs citing this entry. Empty until the matcher has run.
    pub links: Vec<String>,
    /// `None` until a threshold is applied, and forever if the year is unknown.
    pub is_modern: Option<bool>,
}

impl SourceRecord {
    pub fn new(index: usize, raw_text: impl Into<String>) -> Self {
        Self {
            index,
            listed_number: None,
            raw_text: raw_text.into(),
            description: None,
            authors: BTreeSet::new(),
            year: None,
            url: None,
            links: Vec::new(),
            is_modern: None,
        }
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    /// Classify the entry against a minimum acceptable publication year.
    pub fn apply_threshold(&mut self, min_year: i32) {
        self.is_modern = self.year.map(|y| y >= min_year);
    }

    /// `"{index}. {raw_text}"`, the line format used in reports.
    pub fn display_line(&self) -> String {
        format!("{}. {}", self.index, self.raw_text)
    }
}

/// An author fragment matched neither accepted name shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no author found in {0:?}")]
pub struct NoAuthorMatch(pub String);

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("no sources section found")]
    NoSourcesSection,
    #[error("input file not found: {}", .0.display())]
    MissingInputFile(PathBuf),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("check cancelled")]
    Cancelled,
}

/// Which entry-recognition policy turns reference-list paragraphs into records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStrategy {
    /// Keyword/marker classifier with lightweight field extraction.
    Heuristic,
    /// Ordered table of line patterns, first match wins.
    Structural,
    /// Structural table first, heuristic classifier as fallback.
    #[default]
    Combined,
}

impl FromStr for EntryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "structural" => Ok(Self::Structural),
            "combined" => Ok(Self::Combined),
            other => Err(format!(
                "unknown entry strategy '{other}' (expected heuristic, structural or combined)"
            )),
        }
    }
}

impl fmt::Display for EntryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Heuristic => "heuristic",
            Self::Structural => "structural",
            Self::Combined => "combined",
        };
        f.write_str(s)
    }
}

/// Supplies a heading typed in by the user when automatic detection fails.
/// Returning `None` means no manual override is available.
pub type HeadingPrompt = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Options for a single check run.
#[derive(Clone)]
pub struct CheckOptions {
    /// Sources published before this year are reported as outdated.
    pub min_year: i32,
    /// Also count a paragraph as citing when it names every author of the source.
    pub check_authors: bool,
    /// Collect every citing paragraph instead of stopping at the first.
    pub search_links: bool,
    pub entry_strategy: EntryStrategy,
    pub declare_text: Option<HeadingPrompt>,
}

impl CheckOptions {
    pub fn new(min_year: i32) -> Self {
        Self {
            min_year,
            check_authors: true,
            search_links: true,
            entry_strategy: EntryStrategy::default(),
            declare_text: None,
        }
    }

    pub fn with_check_authors(mut self, check_authors: bool) -> Self {
        self.check_authors = check_authors;
        self
    }

    pub fn with_search_links(mut self, search_links: bool) -> Self {
        self.search_links = search_links;
        self
    }

    pub fn with_entry_strategy(mut self, strategy: EntryStrategy) -> Self {
        self.entry_strategy = strategy;
        self
    }

    pub fn with_declare_text(
        mut self,
        prompt: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.declare_text = Some(Arc::new(prompt));
        self
    }
}

impl fmt::Debug for CheckOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckOptions")
            .field("min_year", &self.min_year)
            .field("check_authors", &self.check_authors)
            .field("search_links", &self.search_links)
            .field("entry_strategy", &self.entry_strategy)
            .field(
                "declare_text",
                &self.declare_text.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

/// Progress events emitted during a check run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Extracting {
        path: PathBuf,
    },
    SectionLocated {
        heading_index: usize,
        heading: String,
        total: usize,
    },
    Scanning {
        index: usize,
        total: usize,
        percent: u8,
    },
    SourceChecked {
        index: usize,
        has_links: bool,
        percent: u8,
    },
    Finished {
        total: usize,
    },
}

impl ProgressEvent {
    /// Short task label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Extracting { .. } => "Reading document",
            Self::SectionLocated { .. } => "Locating sources section",
            Self::Scanning { .. } => "Searching sources",
            Self::SourceChecked { .. } => "Checking citations",
            Self::Finished { .. } => "Finishing",
        }
    }

    /// Completion percentage (0–100) of the run.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Extracting { .. } | Self::SectionLocated { .. } => 0,
            Self::Scanning { percent, .. } | Self::SourceChecked { percent, .. } => *percent,
            Self::Finished { .. } => 100,
        }
    }
}
