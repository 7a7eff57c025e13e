use std::path::Path;

use citecheck_core::{BackendError, DocumentBackend};

/// Plain UTF-8 text, one paragraph per non-blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextBackend;

impl DocumentBackend for PlainTextBackend {
    fn paragraphs(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let content = std::fs::read_to_string(path)?;
        Ok(split_paragraphs(&content))
    }
}

pub(crate) fn split_paragraphs(content: &str) -> Vec<String> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paragraphs() {
        let content = "\u{feff}Введение\r\n\r\n  Текст [1].  \nСписок литературы\n1. Иванов И.П. Книга. 2010\n";
        assert_eq!(
            split_paragraphs(content),
            vec![
                "Введение",
                "Текст [1].",
                "Список литературы",
                "1. Иванов И.П. Книга. 2010"
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();
        let result = PlainTextBackend.paragraphs(&path);
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
