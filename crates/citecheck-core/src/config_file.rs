use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::EntryStrategy;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub check: Option<CheckConfig>,
    pub parsing: Option<ParsingSection>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    pub min_year: Option<i32>,
    pub check_authors: Option<bool>,
    pub search_links: Option<bool>,
    pub strategy: Option<EntryStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingSection {
    /// Replaces the built-in heading predicate.
    pub heading_regex: Option<String>,
    /// Extra exact headings (case-insensitive) accepted by the predicate.
    pub heading_phrases: Option<Vec<String>>,
    /// Extra keywords that mark a paragraph as a source for the heuristic classifier.
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub format: Option<String>,
}

/// Platform config directory path: `<config_dir>/citecheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citecheck").join("config.toml"))
}

/// Load config by cascading CWD `.citecheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citecheck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bc, oc) = (base.check.unwrap_or_default(), overlay.check.unwrap_or_default());
    let (bp, op) = (
        base.parsing.unwrap_or_default(),
        overlay.parsing.unwrap_or_default(),
    );
    let (br, or) = (base.report.unwrap_or_default(), overlay.report.unwrap_or_default());

    ConfigFile {
        check: Some(CheckConfig {
            min_year: oc.min_year.or(bc.min_year),
            check_authors: oc.check_authors.or(bc.check_authors),
            search_links: oc.search_links.or(bc.search_links),
            strategy: oc.strategy.or(bc.strategy),
        }),
        parsing: Some(ParsingSection {
            heading_regex: op.heading_regex.or(bp.heading_regex),
            heading_phrases: op.heading_phrases.or(bp.heading_phrases),
            keywords: op.keywords.or(bp.keywords),
        }),
        report: Some(ReportConfig {
            format: or.format.or(br.format),
        }),
    }
}
