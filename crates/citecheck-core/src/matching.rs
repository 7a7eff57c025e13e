use once_cell::sync::Lazy;
use regex::Regex;

use crate::SourceRecord;

/// Bracketed numeric citation: `[3]`, `[1, 3, 7]`, `[3, 7, с. 12]`, `[2, p. 10-12]`.
/// Group 1 holds the comma-separated index list; the trailing page marker accepts
/// Cyrillic `с.`/`С.`, their Latin lookalikes and `p.`/`pp.`.
static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[((?:\d+,\s*)*\d+)(?:,\s*(?:[СсCc]|[Pp]{1,2})\.\s*\d+(?:\s*[-–]\s*\d+)?)?\]")
        .unwrap()
});

/// All source indices cited by bracketed references in `text`, in order of appearance.
pub fn cited_indices(text: &str) -> Vec<usize> {
    CITATION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|list| {
            list.as_str()
                .split(',')
                .filter_map(|n| n.trim().parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Searches a document body for paragraphs that cite one source.
#[derive(Debug, Clone, Copy)]
pub struct CitationMatcher<'a> {
    record: &'a SourceRecord,
    check_authors: bool,
    search_links: bool,
}

impl<'a> CitationMatcher<'a> {
    /// `search_links = false` stops at the first citing paragraph.
    pub fn new(record: &'a SourceRecord, check_authors: bool, search_links: bool) -> Self {
        Self {
            record,
            check_authors,
            search_links,
        }
    }

    /// Whether `paragraph` cites the record, by index or by its full author set.
    pub fn cites(&self, paragraph: &str) -> bool {
        if paragraph == self.record.raw_text {
            return false;
        }
        if cited_indices(paragraph).contains(&self.record.index) {
            return true;
        }
        self.check_authors
            && !self.record.authors.is_empty()
            && self.record.authors.iter().all(|a| a.matches_in(paragraph))
    }

    /// Citing paragraphs, nearest-to-end first.
    pub fn find_citations(&self, body: &[String]) -> Vec<String> {
        let mut links = Vec::new();
        for paragraph in body.iter().rev() {
            if !self.cites(paragraph) {
                continue;
            }
            tracing::trace!(index = self.record.index, "citing paragraph found");
            links.push(paragraph.clone());
            if !self.search_links {
                break;
            }
        }
        links
    }
}
