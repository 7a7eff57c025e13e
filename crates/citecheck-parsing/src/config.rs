use regex::Regex;

use citecheck_core::config_file::ParsingSection;

/// Keywords marking a paragraph as a legal/normative source for the heuristic classifier.
pub const DEFAULT_KEYWORDS: &[&str] = &["федеральн", "положение", "federal", "regulation"];

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for reference-section detection and entry parsing.
///
/// `heading_re` is `None` unless the caller replaced the built-in heading
/// predicate. Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    pub(crate) heading_re: Option<Regex>,
    /// Lowercased exact headings accepted in addition to the predicate.
    pub(crate) heading_phrases: Vec<String>,
    /// Lowercased keywords for the heuristic classifier.
    pub(crate) keywords: Vec<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            heading_re: None,
            heading_phrases: Vec::new(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ParsingConfig {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn heading_phrases(&self) -> &[String] {
        &self.heading_phrases
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    heading_re: Option<String>,
    heading_phrases: Vec<String>,
    keywords: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[parsing]` section of a config file.
    /// Keywords listed there extend the defaults.
    pub fn from_section(section: &ParsingSection) -> Self {
        let mut builder = Self::new();
        if let Some(ref re) = section.heading_regex {
            builder = builder.heading_regex(re);
        }
        for phrase in section.heading_phrases.iter().flatten() {
            builder = builder.add_heading_phrase(phrase);
        }
        for keyword in section.keywords.iter().flatten() {
            builder = builder.add_keyword(keyword);
        }
        builder
    }

    /// Replace the built-in heading predicate with a custom pattern,
    /// matched against the trimmed paragraph.
    pub fn heading_regex(mut self, pattern: &str) -> Self {
        self.heading_re = Some(pattern.to_string());
        self
    }

    pub fn add_heading_phrase(mut self, phrase: &str) -> Self {
        self.heading_phrases.push(phrase.to_string());
        self
    }

    pub fn set_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_keyword(mut self, keyword: &str) -> Self {
        match &mut self.keywords {
            ListOverride::Extend(v) => v.push(keyword.to_string()),
            _ => self.keywords = ListOverride::Extend(vec![keyword.to_string()]),
        }
        self
    }

    /// Compile all string patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let heading_re = self.heading_re.map(|p| Regex::new(&p)).transpose()?;

        let defaults: Vec<String> = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
        let keywords = self
            .keywords
            .resolve(&defaults)
            .into_iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let heading_phrases = self
            .heading_phrases
            .iter()
            .map(|p| normalize_phrase(p))
            .filter(|p| !p.is_empty())
            .collect();

        Ok(ParsingConfig {
            heading_re,
            heading_phrases,
            keywords,
        })
    }
}

/// Lowercase, trim, and drop a trailing period or colon.
pub(crate) fn normalize_phrase(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', ':'])
        .trim_end()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert!(config.heading_re.is_none());
        assert_eq!(config.keywords.len(), DEFAULT_KEYWORDS.len());
    }

    #[test]
    fn test_builder_keywords_extend_and_replace() {
        let config = ParsingConfigBuilder::new()
            .add_keyword("ГОСТ")
            .build()
            .unwrap();
        assert!(config.keywords().contains(&"гост".to_string()));
        assert!(config.keywords().contains(&"федеральн".to_string()));

        let config = ParsingConfigBuilder::new()
            .set_keywords(vec!["закон".to_string()])
            .build()
            .unwrap();
        assert_eq!(config.keywords(), &["закон".to_string()]);
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new().heading_regex(r"[invalid").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_heading_phrases_normalized() {
        let config = ParsingConfigBuilder::new()
            .add_heading_phrase("  Библиография: ")
            .build()
            .unwrap();
        assert_eq!(config.heading_phrases(), &["библиография".to_string()]);
    }

    #[test]
    fn test_from_section() {
        let section = ParsingSection {
            heading_regex: None,
            heading_phrases: Some(vec!["Библиография".to_string()]),
            keywords: Some(vec!["приказ".to_string()]),
        };
        let config = ParsingConfigBuilder::from_section(&section).build().unwrap();
        assert_eq!(config.heading_phrases(), &["библиография".to_string()]);
        assert!(config.keywords().contains(&"приказ".to_string()));
        assert!(config.keywords().contains(&"положение".to_string()));
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
