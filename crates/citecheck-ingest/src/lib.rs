use std::path::Path;

use tokio_util::sync::CancellationToken;

use citecheck_core::{
    BackendError, CheckError, CheckOptions, DocumentBackend, ProgressEvent, SourceRecord,
};
use citecheck_parsing::{ParsingConfig, find_missing_sources};

pub mod docx;
pub mod text;

pub use docx::DocxBackend;
pub use text::PlainTextBackend;

/// Pick a backend from the file extension:
/// - `.docx` / `.docm` → [`DocxBackend`]
/// - `.txt` / `.text` / `.md` → [`PlainTextBackend`]
pub fn backend_for(path: &Path) -> Result<Box<dyn DocumentBackend>, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "docx" | "docm" => Ok(Box::new(DocxBackend::default())),
        "txt" | "text" | "md" => Ok(Box::new(PlainTextBackend)),
        "" => Err(BackendError::Unsupported(format!(
            "{} has no file extension",
            path.display()
        ))),
        other => Err(BackendError::Unsupported(format!(".{other}"))),
    }
}

/// Extract the paragraphs of a document with the backend chosen by extension.
pub fn extract_paragraphs(path: &Path) -> Result<Vec<String>, BackendError> {
    backend_for(path)?.paragraphs(path)
}

/// Run the missing-citation check on a file, choosing the backend by extension.
pub fn check_file(
    path: &Path,
    options: &CheckOptions,
    config: &ParsingConfig,
    progress: impl Fn(ProgressEvent),
    cancel: &CancellationToken,
) -> Result<Vec<SourceRecord>, CheckError> {
    if !path.is_file() {
        return Err(CheckError::MissingInputFile(path.to_path_buf()));
    }
    let backend = backend_for(path)?;
    find_missing_sources(path, backend.as_ref(), options, config, progress, cancel)
}
