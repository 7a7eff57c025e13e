use std::io::Write;

use citecheck_core::SourceRecord;
use citecheck_reporting::ReportSummary;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the header line naming the checked document and its sources heading.
pub fn print_header(
    w: &mut dyn Write,
    file_name: &str,
    heading: Option<&str>,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Checked".bold().cyan(), file_name.bold())?;
    } else {
        writeln!(w, "Checked {}", file_name)?;
    }
    if let Some(heading) = heading {
        writeln!(w, "Sources section: \"{}\"", heading)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print sources the body never cites.
pub fn print_missing(
    w: &mut dyn Write,
    records: &[SourceRecord],
    color: ColorMode,
) -> std::io::Result<()> {
    let missing: Vec<&SourceRecord> = records.iter().filter(|r| !r.has_links()).collect();
    if missing.is_empty() {
        return Ok(());
    }

    if color.enabled() {
        writeln!(w, "{}", "Sources not cited in the text:".red().bold())?;
    } else {
        writeln!(w, "Sources not cited in the text:")?;
    }
    for r in missing {
        if color.enabled() {
            writeln!(w, "  {} {}", format!("{}.", r.index).red(), r.raw_text)?;
        } else {
            writeln!(w, "  {}", r.display_line())?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print dated sources older than the threshold.
pub fn print_outdated(
    w: &mut dyn Write,
    records: &[SourceRecord],
    min_year: i32,
    color: ColorMode,
) -> std::io::Result<()> {
    let outdated: Vec<&SourceRecord> = records
        .iter()
        .filter(|r| r.is_modern == Some(false))
        .collect();
    if outdated.is_empty() {
        return Ok(());
    }

    let title = format!("Sources published before {}:", min_year);
    if color.enabled() {
        writeln!(w, "{}", title.yellow().bold())?;
    } else {
        writeln!(w, "{}", title)?;
    }
    for r in outdated {
        let year = r.year.map(|y| y.to_string()).unwrap_or_default();
        if color.enabled() {
            writeln!(
                w,
                "  {} {} {}",
                format!("{}.", r.index).yellow(),
                r.raw_text,
                format!("({})", year).dimmed()
            )?;
        } else {
            writeln!(w, "  {} ({})", r.display_line(), year)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print each cited source with the paragraphs that cite it.
pub fn print_citations(
    w: &mut dyn Write,
    records: &[SourceRecord],
    color: ColorMode,
) -> std::io::Result<()> {
    for r in records.iter().filter(|r| r.has_links()) {
        if color.enabled() {
            writeln!(w, "{} {}", format!("{}.", r.index).green(), r.raw_text)?;
        } else {
            writeln!(w, "{}", r.display_line())?;
        }
        for link in &r.links {
            let short = shorten(link, 120);
            if color.enabled() {
                writeln!(w, "    {} {}", "<-".dimmed(), short.dimmed())?;
            } else {
                writeln!(w, "    <- {}", short)?;
            }
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print the final summary.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &ReportSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "═".repeat(50).dimmed())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", "═".repeat(50).dimmed())?;
    } else {
        writeln!(w, "{}", "=".repeat(50))?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", "=".repeat(50))?;
    }

    writeln!(w, "  Sources:   {}", summary.total)?;
    if color.enabled() {
        writeln!(w, "  {} {}", "Cited:    ".green(), summary.cited)?;
        writeln!(
            w,
            "  {} {} ({:.1}%)",
            "Not cited:".red(),
            summary.missing,
            summary.missing_pct()
        )?;
        writeln!(
            w,
            "  {} {}",
            format!("Before {}:", summary.min_year).yellow(),
            summary.outdated
        )?;
        writeln!(w, "  {} {}", "Undated:  ".dimmed(), summary.undated)?;
    } else {
        writeln!(w, "  Cited:     {}", summary.cited)?;
        writeln!(
            w,
            "  Not cited: {} ({:.1}%)",
            summary.missing,
            summary.missing_pct()
        )?;
        writeln!(w, "  Before {}: {}", summary.min_year, summary.outdated)?;
        writeln!(w, "  Undated:   {}", summary.undated)?;
    }
    Ok(())
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<SourceRecord> {
        let mut a = SourceRecord::new(1, "Иванов И.П. Книга. 2005");
        a.year = Some(2005);
        a.apply_threshold(2010);
        let mut b = SourceRecord::new(2, "Петров А.С. Статья. 2015");
        b.year = Some(2015);
        b.links = vec!["см. [2]".to_string()];
        b.apply_threshold(2010);
        vec![a, b]
    }

    fn render(f: impl Fn(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_missing_and_outdated() {
        let rs = records();
        let out = render(|w| print_missing(w, &rs, ColorMode(false)));
        assert_eq!(out, "Sources not cited in the text:\n  1. Иванов И.П. Книга. 2005\n\n");

        let out = render(|w| print_outdated(w, &rs, 2010, ColorMode(false)));
        assert!(out.contains("  1. Иванов И.П. Книга. 2005 (2005)"));
    }

    #[test]
    fn test_sections_omitted_when_empty() {
        let out = render(|w| print_outdated(w, &[], 2010, ColorMode(false)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_plain_summary() {
        let summary = ReportSummary::from_records(&records(), 2010);
        let out = render(|w| print_summary(w, &summary, ColorMode(false)));
        assert!(out.contains("Not cited: 1 (50.0%)"));
        assert!(out.contains("Before 2010: 1"));
    }

    #[test]
    fn test_shorten_counts_chars() {
        assert_eq!(shorten("абвгд", 3), "абв...");
        assert_eq!(shorten("абв", 3), "абв");
    }
}
