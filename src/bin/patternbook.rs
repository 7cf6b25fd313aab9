//! Command-line front end for the pattern catalog.
//!
//! `validate` lints a catalog and exits non-zero when any error-severity
//! violation is found, so CI can gate catalog edits on it. The remaining
//! subcommands build the catalog and answer read-only queries against it.
//! Query output goes to stdout; logs and diagnostics go to stderr.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use patternbook::logging::{LogConfig, LogFormat, init_logging};
use patternbook::{
    CatalogQuery, CatalogRegistry, CatalogValidationReport, CategoryId, DuplicateAnnotationPolicy,
    EntryId, LanguageTag, PatternEntry, ValidationOptions, build_language_coverage,
    default_catalog_path, find_repo_root, load_catalog,
};
use serde_json::json;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "patternbook",
    version,
    about = "Validate and query a design-pattern catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Catalog file or directory (default: <repo>/catalog).
    #[arg(long, value_name = "PATH", global = true)]
    catalog: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatArg,

    /// Keep every text when a line is annotated more than once.
    #[arg(long, global = true)]
    merge_duplicate_annotations: bool,

    /// Treat categories without entries as errors.
    #[arg(long, global = true)]
    require_populated_categories: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Lint the catalog and report every violation.
    Validate {
        /// Catalog file or directory; overrides --catalog.
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List categories in declaration order.
    Categories,
    /// List entries, optionally limited to one category.
    List {
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,
    },
    /// Print one entry as JSON.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Print the explanations bound to one line of a code sample.
    Explain {
        #[arg(value_name = "ID")]
        id: String,
        /// cppTraditional, cppModern, or java.
        #[arg(value_name = "LANG")]
        language: String,
        #[arg(value_name = "LINE", allow_negative_numbers = true)]
        line: i64,
    },
    /// Print per-entry language coverage as JSON.
    Coverage,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_format(cli.log_format.into())
        .with_ansi(io::stderr().is_terminal());
    init_logging(&log_config).context("failed to initialize logging")?;

    let options = validation_options(&cli)?;

    match &cli.command {
        Command::Validate { path, format } => {
            let path = match path.as_ref().or(cli.catalog.as_ref()) {
                Some(path) => path.clone(),
                None => default_catalog_path(&find_repo_root()?),
            };
            let report = load_catalog(&path)?.validate(&options);
            print_report(&path, &report, *format)?;
            Ok(if report.has_errors() { 1 } else { 0 })
        }
        Command::Categories => {
            let registry = build_registry(cli.catalog.as_deref(), &options)?;
            for category in registry.list_categories() {
                let count = registry.list_by_category(&category.id).len();
                println!("{}\t{}\t{count}", category.id, category.name);
            }
            Ok(0)
        }
        Command::List { category } => {
            let registry = build_registry(cli.catalog.as_deref(), &options)?;
            let filter = category.as_deref().map(CategoryId::from);
            for entry in registry.list_entries(filter.as_ref()) {
                println!("{}", entry_line(entry));
            }
            Ok(0)
        }
        Command::Show { id } => {
            let registry = build_registry(cli.catalog.as_deref(), &options)?;
            let entry = registry.get_entry(&EntryId::from(id.as_str()))?;
            println!("{}", serde_json::to_string_pretty(entry)?);
            Ok(0)
        }
        Command::Explain { id, language, line } => {
            let language: LanguageTag = language.parse()?;
            let registry = build_registry(cli.catalog.as_deref(), &options)?;
            let texts =
                registry.get_explanation_for_line(&EntryId::from(id.as_str()), language, *line)?;
            for text in texts {
                println!("{text}");
            }
            Ok(0)
        }
        Command::Coverage => {
            let registry = build_registry(cli.catalog.as_deref(), &options)?;
            let coverage = build_language_coverage(&registry);
            println!("{}", serde_json::to_string_pretty(&coverage)?);
            Ok(0)
        }
    }
}

/// Environment policy with command-line flags layered on top.
fn validation_options(cli: &Cli) -> Result<ValidationOptions> {
    let mut options = ValidationOptions::from_env()?;
    if cli.merge_duplicate_annotations {
        options = options.with_duplicate_annotations(DuplicateAnnotationPolicy::Merge);
    }
    if cli.require_populated_categories {
        options = options.with_require_populated_categories(true);
    }
    Ok(options)
}

fn build_registry(catalog: Option<&Path>, options: &ValidationOptions) -> Result<CatalogRegistry> {
    let path = match catalog {
        Some(path) => path.to_path_buf(),
        None => default_catalog_path(&find_repo_root()?),
    };
    match load_catalog(&path)?.build(options) {
        Ok(registry) => Ok(registry),
        Err(report) => {
            eprintln!("{report}");
            bail!(
                "catalog at {} failed validation with {} error(s)",
                path.display(),
                report.error_count()
            );
        }
    }
}

fn entry_line(entry: &PatternEntry) -> String {
    let languages = entry
        .languages()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}\t{}\t{}\t{languages}", entry.id, entry.category, entry.name)
}

fn print_report(path: &Path, report: &CatalogValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if report.is_clean() {
                println!("{}: ok", path.display());
            } else {
                println!("{report}");
            }
        }
        OutputFormat::Json => {
            let payload = json!({
                "catalog": path.display().to_string(),
                "errors": report.error_count(),
                "warnings": report.warning_count(),
                "violations": report.violations,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}
