use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use citecheck_core::config_file::{self, ConfigFile};
use citecheck_core::{CheckError, CheckOptions, EntryStrategy, ProgressEvent};
use citecheck_parsing::{ParsingConfig, ParsingConfigBuilder};
use citecheck_reporting::{ExportFormat, ReportSummary};

mod output;

use output::ColorMode;

/// Citation checker - find reference-list sources a thesis never cites,
/// and sources older than an allowed publication year
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a .docx or .txt document for uncited and outdated sources
    Check {
        /// Path to the document to check
        file_path: PathBuf,

        /// Sources published before this year are reported as outdated
        /// [env: CITECHECK_MIN_YEAR]
        #[arg(long)]
        min_year: Option<i32>,

        /// Also count paragraphs naming every author of a source (default)
        #[arg(long, overrides_with = "no_author_check")]
        author_check: bool,

        /// Count only bracketed numeric citations, not author mentions
        #[arg(long, overrides_with = "author_check")]
        no_author_check: bool,

        /// Collect every citing paragraph for each source (default)
        #[arg(long, overrides_with = "first_match_only")]
        all_matches: bool,

        /// Stop at the first citing paragraph for each source
        #[arg(long, overrides_with = "all_matches")]
        first_match_only: bool,

        /// Heading of the sources section, used when automatic detection fails
        #[arg(long)]
        heading: Option<String>,

        /// Entry recognition strategy: heuristic, structural or combined
        #[arg(long)]
        strategy: Option<EntryStrategy>,

        /// Report format: text, markdown, csv or json
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Write the report to this file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List cited sources together with the paragraphs citing them
        #[arg(long)]
        show_citations: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the effective configuration file contents
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file_config = config_file::load_config();

    match cli.command {
        Command::Config => show_config(&file_config),
        Command::Check {
            file_path,
            min_year,
            author_check,
            no_author_check,
            all_matches,
            first_match_only,
            heading,
            strategy,
            format,
            output,
            show_citations,
            no_color,
        } => {
            let args = CheckArgs {
                file_path,
                min_year,
                check_authors: switch(author_check, no_author_check),
                search_links: switch(all_matches, first_match_only),
                heading,
                strategy,
                format,
                output,
                show_citations,
                no_color,
            };
            check(args, file_config).await
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve an on/off flag pair. `None` when neither was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

struct CheckArgs {
    file_path: PathBuf,
    min_year: Option<i32>,
    check_authors: Option<bool>,
    search_links: Option<bool>,
    heading: Option<String>,
    strategy: Option<EntryStrategy>,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    show_citations: bool,
    no_color: bool,
}

async fn check(args: CheckArgs, file_config: ConfigFile) -> anyhow::Result<()> {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let check_config = file_config.check.clone().unwrap_or_default();
    let min_year = args
        .min_year
        .or_else(|| {
            std::env::var("CITECHECK_MIN_YEAR")
                .ok()
                .and_then(|v| v.trim().parse().ok())
        })
        .or(check_config.min_year)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No minimum publication year given. Pass --min-year, set CITECHECK_MIN_YEAR, \
                 or add `min_year` under [check] in the config file"
            )
        })?;
    let check_authors = args
        .check_authors
        .or(check_config.check_authors)
        .unwrap_or(true);
    let search_links = args
        .search_links
        .or(check_config.search_links)
        .unwrap_or(true);
    let strategy = args
        .strategy
        .or(check_config.strategy)
        .unwrap_or_default();

    let config_format = match file_config.report.as_ref().and_then(|r| r.format.as_deref()) {
        Some(f) => Some(
            f.parse::<ExportFormat>()
                .map_err(|e| anyhow::anyhow!("Invalid report format in config file: {}", e))?,
        ),
        None => None,
    };

    let parsing_config = build_parsing_config(&file_config)?;

    if !args.file_path.exists() {
        anyhow::bail!("File not found: {}", args.file_path.display());
    }

    let progress_bar = ProgressBar::new(100);
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg:<26} [{bar:40.green/dim}] {pos:>3}%")?
            .progress_chars("=> "),
    );
    progress_bar.enable_steady_tick(Duration::from_millis(120));

    let mut options = CheckOptions::new(min_year)
        .with_check_authors(check_authors)
        .with_search_links(search_links)
        .with_entry_strategy(strategy);
    options = match args.heading.clone() {
        Some(heading) => options.with_declare_text(move || Some(heading.clone())),
        None if std::io::stdin().is_terminal() => {
            let pb = progress_bar.clone();
            options.with_declare_text(move || pb.suspend(prompt_heading))
        }
        None => options,
    };
    tracing::debug!(?options, "check options resolved");

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let located_heading: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let progress_cb = {
        let pb = progress_bar.clone();
        let located = Arc::clone(&located_heading);
        move |event: ProgressEvent| {
            pb.set_message(event.label());
            pb.set_position(u64::from(event.percent()));
            if let ProgressEvent::SectionLocated { heading, total, .. } = &event {
                tracing::info!(heading = %heading, entries = total, "sources section found");
                if let Ok(mut slot) = located.lock() {
                    *slot = Some(heading.clone());
                }
            }
        }
    };

    let path = args.file_path.clone();
    let result = tokio::task::spawn_blocking(move || {
        citecheck_ingest::check_file(&path, &options, &parsing_config, progress_cb, &cancel)
    })
    .await?;
    progress_bar.finish_and_clear();

    let records = result.map_err(|e| check_failure(e, &args.file_path))?;

    let summary = ReportSummary::from_records(&records, min_year);

    if let Some(ref output_path) = args.output {
        let format = args
            .format
            .or_else(|| ExportFormat::from_path(output_path))
            .or(config_format)
            .unwrap_or_default();
        citecheck_reporting::export_report(&records, min_year, format, output_path)?;
        eprintln!(
            "Report written to {} ({}; {} of {} sources not cited)",
            output_path.display(),
            format,
            summary.missing,
            summary.total
        );
        return Ok(());
    }

    let mut writer = std::io::stdout().lock();

    if let Some(format) = args.format.or(config_format).filter(|f| *f != ExportFormat::Text) {
        let content = citecheck_reporting::render_report(&records, min_year, format)?;
        writer.write_all(content.as_bytes())?;
        return Ok(());
    }

    let color = ColorMode(!args.no_color && std::io::stdout().is_terminal());
    let file_name = display_name(&args.file_path);

    let heading = located_heading.lock().ok().and_then(|h| h.clone());
    output::print_header(&mut writer, &file_name, heading.as_deref(), color)?;
    if args.show_citations {
        output::print_citations(&mut writer, &records, color)?;
    }
    output::print_missing(&mut writer, &records, color)?;
    output::print_outdated(&mut writer, &records, min_year, color)?;
    output::print_summary(&mut writer, &summary, color)?;

    Ok(())
}

/// Every failed or cancelled run ends the process with a non-zero status.
fn check_failure(err: CheckError, file_path: &Path) -> anyhow::Error {
    match err {
        CheckError::NoSourcesSection => anyhow::anyhow!(
            "No sources section found in {}. Use --heading to name it explicitly",
            file_path.display()
        ),
        CheckError::Cancelled => anyhow::anyhow!("Check cancelled"),
        e => e.into(),
    }
}

fn build_parsing_config(file_config: &ConfigFile) -> anyhow::Result<ParsingConfig> {
    let builder = match file_config.parsing {
        Some(ref section) => ParsingConfigBuilder::from_section(section),
        None => ParsingConfigBuilder::new(),
    };
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid heading_regex in config file: {}", e))
}

/// Ask for the sources heading on the terminal. Empty input means none.
fn prompt_heading() -> Option<String> {
    let mut stderr = std::io::stderr();
    let _ = write!(
        stderr,
        "Sources section heading not recognized.\n\
         Enter the heading exactly as it appears in the document (empty to skip): "
    );
    let _ = stderr.flush();

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    let heading = line.trim();
    (!heading.is_empty()).then(|| heading.to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn show_config(file_config: &ConfigFile) -> anyhow::Result<()> {
    match config_file::config_path() {
        Some(path) => eprintln!("# platform config: {}", path.display()),
        None => eprintln!("# platform config: unavailable"),
    }
    print!("{}", toml::to_string_pretty(file_config)?);
    Ok(())
}
