use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("unsupported document type: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document text extraction backends.
///
/// Implementors turn a document container into its ordered paragraph texts;
/// everything downstream (heading detection, entry parsing, citation matching)
/// works on that flat sequence.
pub trait DocumentBackend: Send + Sync {
    /// Extract the paragraphs of a document, in document order.
    fn paragraphs(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}
