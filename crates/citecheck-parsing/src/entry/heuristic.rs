//! Marker-based entry classifier.
//!
//! A paragraph counts as a source when it carries a page-count marker
//! ("200 с.", "15 p."), the `//` journal separator, a four-digit year,
//! or one of the configured normative-act keywords.

use once_cell::sync::Lazy;
use regex::Regex;

use citecheck_core::{extract_year_with_current_year, parse_authors};

use super::EntryFields;
use crate::config::ParsingConfig;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[0-9]+\s?[СCсcP]\.)|(?://)|(?:[12][0-9]{3})").unwrap()
});

static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,6})\s*[.)]\s").unwrap());

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s\]\)>]+").unwrap());

pub fn is_source_entry(text: &str, config: &ParsingConfig) -> bool {
    if MARKER_RE.is_match(text) {
        return true;
    }
    let lower = text.to_lowercase();
    config.keywords().iter().any(|k| lower.contains(k.as_str()))
}

pub fn recognize(text: &str, config: &ParsingConfig, current_year: i32) -> Option<EntryFields> {
    if !is_source_entry(text, config) {
        return None;
    }

    let url = URL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string());
    let mut year = extract_year_with_current_year(text, current_year);
    if year.is_none() && url.is_some() {
        year = Some(current_year);
    }

    Some(EntryFields {
        listed_number: LEADING_NUMBER_RE
            .captures(text)
            .and_then(|c| c[1].parse().ok()),
        description: None,
        authors: parse_authors(text),
        year,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfigBuilder;

    #[test]
    fn test_markers() {
        let config = ParsingConfig::default();
        assert!(is_source_entry("Иванов И.П. Книга. М.: Наука, 200 с.", &config));
        assert!(is_source_entry("Петров А.С. Статья // Вестник", &config));
        assert!(is_source_entry("Smith J. Book. London, 1998", &config));
        assert!(is_source_entry("Smith J. Book. 15 p.", &config));
        assert!(is_source_entry("Положение о порядке проведения практики", &config));
        assert!(is_source_entry("Federal Law on Data", &config));
        assert!(!is_source_entry("Приложение А", &config));
        assert!(!is_source_entry("Таблица 3 – Результаты", &config));
    }

    #[test]
    fn test_configured_keyword() {
        let config = ParsingConfigBuilder::new().add_keyword("приказ").build().unwrap();
        assert!(is_source_entry("Приказ Минобрнауки России № 301", &config));
    }

    #[test]
    fn test_fields() {
        let config = ParsingConfig::default();
        let fields = recognize(
            "2. Иванов И.П., Петров А.С. Теория систем. М.: Наука, 2010. 200 с.",
            &config,
            2024,
        )
        .unwrap();
        assert_eq!(fields.listed_number, Some(2));
        assert_eq!(fields.year, Some(2010));
        assert_eq!(fields.authors.len(), 2);
        assert!(fields.url.is_none());
    }

    #[test]
    fn test_future_year_ignored() {
        let config = ParsingConfig::default();
        let fields = recognize("Сборник трудов. 1999, переиздание 2031", &config, 2024).unwrap();
        assert_eq!(fields.year, Some(1999));
    }

    #[test]
    fn test_link_entry_without_year_defaults_to_current() {
        let config = ParsingConfig::default();
        let fields = recognize(
            "Положение о кафедре. URL: https://example.ru/doc.",
            &config,
            2024,
        )
        .unwrap();
        assert_eq!(fields.url.as_deref(), Some("https://example.ru/doc"));
        assert_eq!(fields.year, Some(2024));
    }
}
