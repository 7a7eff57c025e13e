//! Paragraph extraction from Office Open XML (`.docx`) documents.
//!
//! A `.docx` is a ZIP container; the running text lives in
//! `word/document.xml` and endnotes in `word/endnotes.xml`. Each `<w:p>`
//! element becomes one paragraph string.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::result::ZipError;

use citecheck_core::{BackendError, DocumentBackend};

const DOCUMENT_PART: &str = "word/document.xml";
const ENDNOTES_PART: &str = "word/endnotes.xml";

/// Reads `.docx` documents with `zip` + `quick-xml`.
#[derive(Debug, Clone)]
pub struct DocxBackend {
    include_endnotes: bool,
}

impl Default for DocxBackend {
    fn default() -> Self {
        Self {
            include_endnotes: true,
        }
    }
}

impl DocxBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append endnotes after the document paragraphs as `"{id}. {text}"`.
    pub fn with_endnotes(mut self, include: bool) -> Self {
        self.include_endnotes = include;
        self
    }
}

impl DocumentBackend for DocxBackend {
    fn paragraphs(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| BackendError::OpenError(format!("{}: {e}", path.display())))?;

        let mut paragraphs: Vec<String> = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| {
                BackendError::ExtractionError(format!(
                    "{}: missing {DOCUMENT_PART}",
                    path.display()
                ))
            })?
            .into_iter()
            .map(|p| p.text)
            .collect();

        if self.include_endnotes {
            if let Some(notes) = read_part(&mut archive, ENDNOTES_PART)? {
                let endnotes = collect_endnotes(notes);
                tracing::debug!(count = endnotes.len(), "endnotes appended");
                paragraphs.extend(endnotes);
            }
        }

        tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "docx parsed");
        Ok(paragraphs)
    }
}

/// One `<w:p>` and the endnote it belongs to, if any.
#[derive(Debug, Clone, PartialEq)]
struct XmlParagraph {
    text: String,
    note_id: Option<i64>,
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<XmlParagraph>>, BackendError> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(BackendError::ExtractionError(format!("{name}: {e}"))),
    };
    parse_paragraphs(BufReader::new(entry))
        .map(Some)
        .map_err(|e| BackendError::ExtractionError(format!("{name}: {e}")))
}

/// Endnotes with positive ids, one line each. Ids 0 and -1 are the
/// separator pseudo-notes Word always writes.
fn collect_endnotes(paragraphs: Vec<XmlParagraph>) -> Vec<String> {
    let mut notes: Vec<(i64, Vec<String>)> = Vec::new();
    for p in paragraphs {
        let Some(id) = p.note_id.filter(|&id| id > 0) else {
            continue;
        };
        if p.text.is_empty() {
            continue;
        }
        match notes.last_mut() {
            Some((last, parts)) if *last == id => parts.push(p.text),
            _ => notes.push((id, vec![p.text])),
        }
    }
    notes
        .into_iter()
        .map(|(id, parts)| format!("{id}. {}", parts.join(" ")))
        .collect()
}

/// Walk a WordprocessingML part and collect the text of every top-level paragraph.
///
/// Paragraphs nested in text boxes are folded into their enclosing paragraph.
fn parse_paragraphs<R: BufRead>(reader: R) -> Result<Vec<XmlParagraph>, quick_xml::Error> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);
    let mut paragraphs = Vec::new();

    let mut depth = 0usize;
    let mut in_text = false;
    let mut current = String::new();
    let mut note_id: Option<i64> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:p" => depth += 1,
                b"w:t" if depth > 0 => in_text = true,
                b"w:endnote" | b"w:footnote" => {
                    note_id = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"w:id")
                        .and_then(|a| String::from_utf8_lossy(&a.value).parse().ok());
                }
                _ => {}
            },

            Event::Empty(ref e) => match e.name().as_ref() {
                b"w:p" if depth == 0 => paragraphs.push(XmlParagraph {
                    text: String::new(),
                    note_id,
                }),
                b"w:tab" if depth > 0 => current.push('\t'),
                b"w:br" | b"w:cr" if depth > 0 => current.push(' '),
                b"w:noBreakHyphen" if depth > 0 => current.push('-'),
                _ => {}
            },

            Event::Text(ref e) => {
                if in_text {
                    current.push_str(&e.unescape()?);
                }
            }

            Event::CData(ref e) => {
                if in_text {
                    current.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }

            Event::End(ref e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        paragraphs.push(XmlParagraph {
                            text: current.trim().to_string(),
                            note_id,
                        });
                        current.clear();
                    }
                }
                b"w:endnote" | b"w:footnote" => note_id = None,
                _ => {}
            },

            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(paragraphs)
}
