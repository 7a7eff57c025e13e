use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{ParsingConfig, normalize_phrase};

/// One heading phrase: an optional qualifier ("список", "использованных",
/// "list of", "used", "cited") followed by a sources noun.
const HEADING_GROUP: &str = concat!(
    r"(?:",
    r"(?:(?:список|перечень|использованн[а-яё]*|цитированн[а-яё]*)\s+)?",
    r"(?:использ[а-яё]*\s+)?",
    r"(?:литератур[а-яё]*|источник[а-яё]*|библиограф[а-яё]*)",
    r"|",
    r"(?:(?:list\s+of\s+)?(?:used|cited)\s+)?",
    r"(?:references|literature|sources|bibliography|works\s+cited)",
    r")"
);

/// Whole-paragraph heading: one or more phrases joined by "и"/"and",
/// with an optional trailing period or colon.
static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{g}(?:\s+(?:и|and)\s+{g})*\s*[.:]?$",
        g = HEADING_GROUP
    ))
    .unwrap()
});

/// Whether a paragraph is a reference-list heading under the built-in rules.
///
/// Case-insensitive over Russian and English phrasings. Paragraphs that merely
/// contain a sources noun ("Денежные источники", "sources of income") are rejected.
pub fn is_sources_heading(text: &str) -> bool {
    HEADING_RE.is_match(text.trim())
}

/// Heading predicate with optional user overrides applied.
#[derive(Debug, Clone, Copy)]
pub struct HeadingDetector<'a> {
    config: &'a ParsingConfig,
}

impl<'a> HeadingDetector<'a> {
    pub fn new(config: &'a ParsingConfig) -> Self {
        Self { config }
    }

    pub fn is_heading(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        let by_pattern = match self.config.heading_re {
            Some(ref re) => re.is_match(trimmed),
            None => HEADING_RE.is_match(trimmed),
        };
        by_pattern || self.matches_phrase(trimmed)
    }

    fn matches_phrase(&self, text: &str) -> bool {
        if self.config.heading_phrases.is_empty() {
            return false;
        }
        let normalized = normalize_phrase(text);
        self.config.heading_phrases.iter().any(|p| *p == normalized)
    }

    /// Index of the LAST paragraph accepted as a heading.
    ///
    /// Tables of contents and introductions often mention the reference list
    /// by name before the list itself starts.
    pub fn find_heading(&self, paragraphs: &[String]) -> Option<usize> {
        paragraphs.iter().rposition(|p| self.is_heading(p))
    }
}

/// Index of the LAST paragraph equal to `heading`, compared after trimming both sides.
pub fn find_heading_exact(paragraphs: &[String], heading: &str) -> Option<usize> {
    let heading = heading.trim();
    if heading.is_empty() {
        return None;
    }
    paragraphs.iter().rposition(|p| p.trim() == heading)
}
