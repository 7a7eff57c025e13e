use citecheck_core::{CheckError, HeadingPrompt};

use crate::section::{HeadingDetector, find_heading_exact};

/// A document's paragraphs split at the reference-list heading.
///
/// The heading paragraph itself belongs to neither side: the body is
/// everything before it and the sources are everything after it.
#[derive(Debug, Clone)]
pub struct Document {
    paragraphs: Vec<String>,
    heading_index: usize,
}

impl Document {
    /// Build a document around a known heading position.
    /// Returns `None` when `heading_index` is out of range.
    pub fn with_heading(paragraphs: Vec<String>, heading_index: usize) -> Option<Self> {
        (heading_index < paragraphs.len()).then_some(Self {
            paragraphs,
            heading_index,
        })
    }

    /// Locate the reference-list heading.
    ///
    /// The detector's last match wins. If nothing matches and a prompt is
    /// available, its answer is looked up verbatim (last match again).
    pub fn locate(
        paragraphs: Vec<String>,
        detector: &HeadingDetector<'_>,
        prompt: Option<&HeadingPrompt>,
    ) -> Result<Self, CheckError> {
        if let Some(index) = detector.find_heading(&paragraphs) {
            tracing::debug!(index, heading = %paragraphs[index], "sources heading detected");
            return Self::with_heading(paragraphs, index).ok_or(CheckError::NoSourcesSection);
        }

        let Some(prompt) = prompt else {
            return Err(CheckError::NoSourcesSection);
        };
        let Some(answer) = prompt() else {
            tracing::debug!("no heading supplied by prompt");
            return Err(CheckError::NoSourcesSection);
        };

        match find_heading_exact(&paragraphs, &answer) {
            Some(index) => {
                tracing::debug!(index, heading = %answer.trim(), "sources heading supplied manually");
                Self::with_heading(paragraphs, index).ok_or(CheckError::NoSourcesSection)
            }
            None => {
                tracing::warn!(heading = %answer.trim(), "supplied heading not found in document");
                Err(CheckError::NoSourcesSection)
            }
        }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn heading_index(&self) -> usize {
        self.heading_index
    }

    /// First paragraph of the reference list.
    pub fn split_index(&self) -> usize {
        self.heading_index + 1
    }

    pub fn heading(&self) -> &str {
        &self.paragraphs[self.heading_index]
    }

    pub fn body(&self) -> &[String] {
        &self.paragraphs[..self.heading_index]
    }

    pub fn sources(&self) -> &[String] {
        &self.paragraphs[self.split_index()..]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ParsingConfig;

    fn paras(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_excludes_heading() {
        let doc = Document::with_heading(paras(&["a", "b", "Список литературы", "1", "2"]), 2)
            .unwrap();
        assert_eq!(doc.body(), &["a".to_string(), "b".to_string()]);
        assert_eq!(doc.sources(), &["1".to_string(), "2".to_string()]);
        assert_eq!(doc.heading(), "Список литературы");
        assert_eq!(doc.split_index(), 3);
    }

    #[test]
    fn test_heading_as_last_paragraph_gives_empty_sources() {
        let doc = Document::with_heading(paras(&["a", "Литература"]), 1).unwrap();
        assert!(doc.sources().is_empty());
        assert_eq!(doc.split_index(), doc.paragraphs().len());
    }

    #[test]
    fn test_with_heading_out_of_range() {
        assert!(Document::with_heading(paras(&["a"]), 1).is_none());
    }

    #[test]
    fn test_locate_auto() {
        let config = ParsingConfig::default();
        let detector = HeadingDetector::new(&config);
        let doc = Document::locate(
            paras(&["Введение", "Текст [1]", "Список литературы", "1. Иванов И.П. 2010"]),
            &detector,
            None,
        )
        .unwrap();
        assert_eq!(doc.heading_index(), 2);
    }

    #[test]
    fn test_locate_falls_back_to_prompt() {
        let config = ParsingConfig::default();
        let detector = HeadingDetector::new(&config);
        let prompt: HeadingPrompt = Arc::new(|| Some("Мои ссылки".to_string()));
        let doc = Document::locate(
            paras(&["Текст", "Мои ссылки", "1. Иванов И.П. 2010"]),
            &detector,
            Some(&prompt),
        )
        .unwrap();
        assert_eq!(doc.heading(), "Мои ссылки");
    }

    #[test]
    fn test_locate_without_heading_fails() {
        let config = ParsingConfig::default();
        let detector = HeadingDetector::new(&config);
        let none: HeadingPrompt = Arc::new(|| None);
        let wrong: HeadingPrompt = Arc::new(|| Some("Нет такого".to_string()));

        for prompt in [None, Some(&none), Some(&wrong)] {
            let result = Document::locate(paras(&["Текст", "Ещё текст"]), &detector, prompt);
            assert!(matches!(result, Err(CheckError::NoSourcesSection)));
        }
    }
}
