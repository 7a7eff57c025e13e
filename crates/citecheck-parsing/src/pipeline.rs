use std::path::Path;

use tokio_util::sync::CancellationToken;

use citecheck_core::{
    CheckError, CheckOptions, CitationMatcher, DocumentBackend, ProgressEvent, SourceRecord,
};

use crate::config::ParsingConfig;
use crate::document::Document;
use crate::entry::SourceBuilder;
use crate::section::HeadingDetector;

/// Check a document file for uncited and outdated sources.
///
/// Returns one record per accepted reference-list entry, in list order.
/// Records with empty `links` are the sources the body never cites.
pub fn find_missing_sources(
    path: &Path,
    backend: &dyn DocumentBackend,
    options: &CheckOptions,
    config: &ParsingConfig,
    progress: impl Fn(ProgressEvent),
    cancel: &CancellationToken,
) -> Result<Vec<SourceRecord>, CheckError> {
    if !path.is_file() {
        return Err(CheckError::MissingInputFile(path.to_path_buf()));
    }

    progress(ProgressEvent::Extracting {
        path: path.to_path_buf(),
    });
    let paragraphs = backend.paragraphs(path)?;
    tracing::info!(path = %path.display(), paragraphs = paragraphs.len(), "document extracted");

    find_missing_sources_in(paragraphs, options, config, progress, cancel)
}

/// Same as [`find_missing_sources`], over already-extracted paragraphs.
pub fn find_missing_sources_in(
    paragraphs: Vec<String>,
    options: &CheckOptions,
    config: &ParsingConfig,
    progress: impl Fn(ProgressEvent),
    cancel: &CancellationToken,
) -> Result<Vec<SourceRecord>, CheckError> {
    let detector = HeadingDetector::new(config);
    let document = Document::locate(paragraphs, &detector, options.declare_text.as_ref())?;

    let sources = document.sources();
    if sources.is_empty() {
        tracing::warn!(heading = document.heading(), "sources heading has no entries after it");
        return Err(CheckError::NoSourcesSection);
    }

    let total = sources.len();
    progress(ProgressEvent::SectionLocated {
        heading_index: document.heading_index(),
        heading: document.heading().to_string(),
        total,
    });
    tracing::info!(
        heading_index = document.heading_index(),
        body = document.body().len(),
        sources = total,
        strategy = %options.entry_strategy,
        "sources section located"
    );

    let mut builder = SourceBuilder::new(options.entry_strategy, config);
    let mut records = Vec::new();

    for (i, paragraph) in sources.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(checked = records.len(), "check cancelled");
            return Err(CheckError::Cancelled);
        }

        let percent = (i * 100 / total) as u8;
        progress(ProgressEvent::Scanning {
            index: i,
            total,
            percent,
        });

        if paragraph.trim().is_empty() {
            continue;
        }
        let Some(mut record) = builder.try_build(paragraph) else {
            tracing::debug!(paragraph = %paragraph, "not a source entry");
            continue;
        };

        let links = CitationMatcher::new(&record, options.check_authors, options.search_links)
            .find_citations(document.body());
        record.links = links;
        record.apply_threshold(options.min_year);

        tracing::debug!(
            index = record.index,
            links = record.links.len(),
            year = ?record.year,
            "source checked"
        );
        progress(ProgressEvent::SourceChecked {
            index: record.index,
            has_links: record.has_links(),
            percent,
        });
        records.push(record);
    }

    let missing = records.iter().filter(|r| !r.has_links()).count();
    tracing::info!(sources = records.len(), missing, "check finished");
    progress(ProgressEvent::Finished {
        total: records.len(),
    });

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn paras(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scanning_percentages() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let records = find_missing_sources_in(
            paras(&[
                "Текст [1].",
                "Список литературы",
                "1. Иванов И.П. Книга. 2010",
                "2. Петров А.С. Книга. 2011",
                "3. Сидоров С.С. Книга. 2012",
                "4. Козлов К.К. Книга. 2013",
            ]),
            &CheckOptions::new(2000),
            &ParsingConfig::default(),
            move |e| sink.lock().unwrap().push(e),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(records.len(), 4);

        let events = events.lock().unwrap();
        let scanning: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Scanning { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(scanning, vec![0, 25, 50, 75]);
        assert!(matches!(events.last(), Some(ProgressEvent::Finished { total: 4 })));
    }

    #[test]
    fn test_cancelled_before_first_entry() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = find_missing_sources_in(
            paras(&["Текст", "Литература", "1. Иванов И.П. Книга. 2010"]),
            &CheckOptions::new(2000),
            &ParsingConfig::default(),
            |_| {},
            &cancel,
        );
        assert!(matches!(result, Err(CheckError::Cancelled)));
    }

    #[test]
    fn test_heading_without_entries() {
        let result = find_missing_sources_in(
            paras(&["Текст [1].", "Список литературы"]),
            &CheckOptions::new(2000),
            &ParsingConfig::default(),
            |_| {},
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(CheckError::NoSourcesSection)));
    }
}
