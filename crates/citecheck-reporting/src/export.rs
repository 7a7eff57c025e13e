use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use citecheck_core::SourceRecord;

use crate::summary::{ReportSummary, missing_lines, outdated_lines, year_histogram};
use crate::{ExportFormat, ReportError};

/// Render a report for one checked document.
pub fn render_report(
    records: &[SourceRecord],
    min_year: i32,
    format: ExportFormat,
) -> Result<String, ReportError> {
    let summary = ReportSummary::from_records(records, min_year);
    Ok(match format {
        ExportFormat::Text => export_text(records, &summary),
        ExportFormat::Markdown => export_markdown(records, &summary),
        ExportFormat::Csv => export_csv(records),
        ExportFormat::Json => export_json(records, &summary)?,
    })
}

/// Render a report and write it to `path`.
pub fn export_report(
    records: &[SourceRecord],
    min_year: i32,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let content = render_report(records, min_year, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    tracing::info!(path = %path.display(), %format, "report written");
    Ok(())
}

fn export_text(records: &[SourceRecord], s: &ReportSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sources: {}", s.total);
    let _ = writeln!(out, "Cited: {}", s.cited);
    let _ = writeln!(out, "Not cited: {} ({:.1}%)", s.missing, s.missing_pct());
    let _ = writeln!(out, "Published before {}: {}", s.min_year, s.outdated);
    let _ = writeln!(out, "Undated: {}", s.undated);

    let missing = missing_lines(records);
    if !missing.is_empty() {
        out.push_str("\nSources not cited in the text:\n");
        for line in &missing {
            let _ = writeln!(out, "{line}");
        }
    }

    let outdated = outdated_lines(records);
    if !outdated.is_empty() {
        let _ = writeln!(out, "\nSources published before {}:", s.min_year);
        for line in &outdated {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|").replace('*', "\\*").replace('_', "\\_")
}

fn export_markdown(records: &[SourceRecord], s: &ReportSummary) -> String {
    let mut out = String::from("# Citation report\n\n");
    out.push_str("| Metric | Count |\n|---|---|\n");
    let _ = writeln!(out, "| Sources | {} |", s.total);
    let _ = writeln!(out, "| Cited | {} |", s.cited);
    let _ = writeln!(out, "| Not cited | {} |", s.missing);
    let _ = writeln!(out, "| Published before {} | {} |", s.min_year, s.outdated);
    let _ = writeln!(out, "| Undated | {} |", s.undated);

    let missing: Vec<&SourceRecord> = records.iter().filter(|r| !r.has_links()).collect();
    if !missing.is_empty() {
        out.push_str("\n## Not cited\n\n");
        for r in missing {
            let _ = writeln!(out, "{}. {}", r.index, md_escape(&r.raw_text));
        }
    }

    let outdated: Vec<&SourceRecord> = records
        .iter()
        .filter(|r| r.is_modern == Some(false))
        .collect();
    if !outdated.is_empty() {
        let _ = writeln!(out, "\n## Published before {}\n", s.min_year);
        for r in outdated {
            let year = r.year.map(|y| y.to_string()).unwrap_or_default();
            let _ = writeln!(out, "{}. {} *({year})*", r.index, md_escape(&r.raw_text));
        }
    }

    let histogram = year_histogram(records);
    if !histogram.is_empty() {
        out.push_str("\n## Sources by year\n\n| Year | Sources |\n|---|---|\n");
        for (year, count) in &histogram {
            let _ = writeln!(out, "| {year} | {count} |");
        }
    }
    out
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains(';') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn export_csv(records: &[SourceRecord]) -> String {
    let mut out = String::from("Index,ListedNumber,Year,Modern,Cited,Citations,Authors,Url,Text\n");
    for r in records {
        let authors = r
            .authors
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let modern = match r.is_modern {
            Some(true) => "yes",
            Some(false) => "no",
            None => "",
        };
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            r.index,
            r.listed_number.map(|n| n.to_string()).unwrap_or_default(),
            r.year.map(|y| y.to_string()).unwrap_or_default(),
            modern,
            if r.has_links() { "yes" } else { "no" },
            r.links.len(),
            csv_escape(&authors),
            csv_escape(r.url.as_deref().unwrap_or("")),
            csv_escape(&r.raw_text),
        );
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a ReportSummary,
    years: std::collections::BTreeMap<i32, usize>,
    sources: &'a [SourceRecord],
}

fn export_json(records: &[SourceRecord], summary: &ReportSummary) -> Result<String, ReportError> {
    let report = JsonReport {
        summary,
        years: year_histogram(records),
        sources: records,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
