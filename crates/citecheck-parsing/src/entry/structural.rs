//! Ordered table of numbered-entry patterns. The first pattern that matches
//! a paragraph decides its fields; later patterns are not consulted.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use citecheck_core::{extract_year_with_current_year, parse_authors};

use super::{EntryFields, MalformedEntry};

/// Surname with initials: `Иванов И.П.`, `Иванов, И. П.`, `Smith J.`
const AUTHOR: &str = r"\p{Lu}\p{Ll}+(?:-\p{Lu}?\p{Ll}+)*,?\s?\p{Lu}\.\s?(?:\p{Lu}\.)?";

type FieldBuilder = fn(&Captures, i32) -> Result<EntryFields, MalformedEntry>;

static PATTERNS: Lazy<Vec<(&'static str, Regex, FieldBuilder)>> = Lazy::new(|| {
    vec![
        (
            "bracketed-link",
            Regex::new(r"^(\d+)\.?\s*\[\s*(https?://[^\]\s]+)\s*\]\s*[-–—.:,]?\s*(.+)$").unwrap(),
            bracketed_link as FieldBuilder,
        ),
        (
            "journal",
            Regex::new(&format!(
                r"^(\d+)\.?\s*((?:{AUTHOR},?\s*)+)(.+?)\s*/\s*(.+?)\s*//.*?([12]\d{{3}})"
            ))
            .unwrap(),
            journal as FieldBuilder,
        ),
        (
            "authors-title-year",
            Regex::new(&format!(
                r"^(\d+)\.?\s*((?:{AUTHOR},?\s*)+)(.+?)[\s.,]*([12]\d{{3}})\.?$"
            ))
            .unwrap(),
            authors_title_year as FieldBuilder,
        ),
        (
            "electronic-resource",
            Regex::new(concat!(
                r"^(\d+)\.?\s*(.*?(?i:электронный\s+ресурс|electronic\s+resource).*?)",
                r"[\s.:;–—-]*(?:URL:?\s*)?[\[<]?(https?://[^\s\]>]+?)[\]>]?\.?\s*",
                r"(?:\(([^)]*)\))?\.?\s*$"
            ))
            .unwrap(),
            electronic_resource as FieldBuilder,
        ),
    ]
});

/// Match `text` against the pattern table.
///
/// `Ok(None)` means no pattern applies. `Err` means a pattern matched but a
/// captured field could not be converted, and the entry should be skipped.
pub fn recognize(text: &str, current_year: i32) -> Result<Option<EntryFields>, MalformedEntry> {
    for (name, re, build) in PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            tracing::trace!(pattern = name, "structural pattern matched");
            return build(&caps, current_year).map(Some);
        }
    }
    Ok(None)
}

fn list_number(caps: &Captures) -> Result<u32, MalformedEntry> {
    caps[1]
        .parse()
        .map_err(|_| MalformedEntry::ListNumber(caps[1].to_string()))
}

fn explicit_year(raw: &str, current_year: i32) -> Result<Option<i32>, MalformedEntry> {
    let year: i32 = raw
        .parse()
        .map_err(|_| MalformedEntry::Year(raw.to_string()))?;
    Ok((year <= current_year).then_some(year))
}

fn bracketed_link(caps: &Captures, current_year: i32) -> Result<EntryFields, MalformedEntry> {
    let description = caps[3].trim().to_string();
    Ok(EntryFields {
        listed_number: Some(list_number(caps)?),
        authors: parse_authors(&description),
        year: Some(
            extract_year_with_current_year(&description, current_year).unwrap_or(current_year),
        ),
        url: Some(caps[2].to_string()),
        description: Some(description),
    })
}

fn journal(caps: &Captures, current_year: i32) -> Result<EntryFields, MalformedEntry> {
    Ok(EntryFields {
        listed_number: Some(list_number(caps)?),
        description: Some(caps[3].trim().to_string()),
        authors: parse_authors(&caps[2]),
        year: explicit_year(&caps[5], current_year)?,
        url: None,
    })
}

fn authors_title_year(caps: &Captures, current_year: i32) -> Result<EntryFields, MalformedEntry> {
    Ok(EntryFields {
        listed_number: Some(list_number(caps)?),
        description: Some(caps[3].trim().to_string()),
        authors: parse_authors(&caps[2]),
        year: explicit_year(&caps[4], current_year)?,
        url: None,
    })
}

fn electronic_resource(caps: &Captures, current_year: i32) -> Result<EntryFields, MalformedEntry> {
    let description = caps[2].trim().to_string();
    let access_note = caps.get(4).map_or("", |m| m.as_str());
    let year = extract_year_with_current_year(&description, current_year)
        .or_else(|| extract_year_with_current_year(access_note, current_year))
        .unwrap_or(current_year);
    Ok(EntryFields {
        listed_number: Some(list_number(caps)?),
        authors: parse_authors(&description),
        year: Some(year),
        url: Some(caps[3].to_string()),
        description: Some(description),
    })
}
