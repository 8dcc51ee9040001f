//! bibrecords CLI - import BibTeX into publication records and count them

use anyhow::{Context, Result};
use bibrecords::aggregate::{YearOrder, YearSeries, aggregate_records};
use bibrecords::loader::load_records;
use bibrecords::{CollisionPolicy, ImportConfig, ImportError, WriteMode, import_file};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SOURCE: &str = "citations.bib";
const DEFAULT_CONTENT_DIR: &str = "src/content/publications";

#[derive(Parser)]
#[command(name = "bibrecords")]
#[command(version)]
#[command(about = "Import BibTeX citations as publication records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a BibTeX file into one record file per entry
    Import {
        /// BibTeX file to import
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        input: PathBuf,

        /// Directory the records are written to
        #[arg(short, long, default_value = DEFAULT_CONTENT_DIR)]
        output_dir: PathBuf,

        /// TOML file with import settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Leave records that already exist untouched
        #[arg(long)]
        skip_existing: bool,

        /// Append -2, -3, ... to file names already produced in this run
        #[arg(long)]
        disambiguate: bool,
    },

    /// Print the number of records per year
    Stats {
        /// Directory holding the records
        #[arg(short, long, default_value = DEFAULT_CONTENT_DIR)]
        dir: PathBuf,

        /// Record file extension
        #[arg(long, default_value = "md")]
        extension: String,

        /// Sort years as text instead of numbers
        #[arg(long)]
        lexical: bool,

        /// Print CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibrecords=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            output_dir,
            config,
            skip_existing,
            disambiguate,
        } => run_import(input, output_dir, config, skip_existing, disambiguate),
        Commands::Stats {
            dir,
            extension,
            lexical,
            csv,
        } => run_stats(dir, &extension, lexical, csv),
    };

    ExitCode::from(finish(result))
}

/// Report the outcome of a command and return the process exit status.
fn finish(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            for line in failure_lines(&err) {
                eprintln!("{line}");
            }
            1
        }
    }
}

fn failure_lines(err: &anyhow::Error) -> Vec<String> {
    let mut lines = vec![format!("Error: {err:#}")];
    if let Some(ImportError::SourceNotFound(path)) = err.downcast_ref::<ImportError>() {
        lines.push(missing_source_hint(path));
    }
    lines
}

/// Remediation hint naming the configured source file.
fn missing_source_hint(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
    format!("Please place your \"{name}\" file in the project root.")
}

fn run_import(
    input: PathBuf,
    output_dir: PathBuf,
    config_path: Option<PathBuf>,
    skip_existing: bool,
    disambiguate: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => ImportConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    if skip_existing {
        config.set_write_mode(WriteMode::SkipExisting);
    }
    if disambiguate {
        config.set_collision_policy(CollisionPolicy::Disambiguate);
    }

    let summary = import_file(&input, &output_dir, &config)?;

    println!();
    println!("Successfully imported {} publications.", summary.imported);
    if summary.skipped > 0 {
        println!("Skipped {} entries.", summary.skipped);
    }
    if summary.unchanged > 0 {
        println!("Kept {} existing records.", summary.unchanged);
    }
    if summary.failed > 0 {
        println!("Failed to write {} records.", summary.failed);
    }
    Ok(())
}

fn run_stats(dir: PathBuf, extension: &str, lexical: bool, csv: bool) -> Result<()> {
    let records = load_records(&dir, extension)
        .with_context(|| format!("failed to read records from {}", dir.display()))?;
    let order = if lexical {
        YearOrder::Lexical
    } else {
        YearOrder::Numeric
    };
    let buckets = aggregate_records(&records, order);

    if csv {
        bibrecords::aggregate::write_csv(&buckets, std::io::stdout().lock())?;
        return Ok(());
    }

    let series = YearSeries::from(buckets.as_slice());
    for (label, count) in series.labels.iter().zip(&series.counts) {
        println!("{label}\t{count}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("citations.bib", "citations.bib")]
    #[case("refs/my.bib", "my.bib")]
    #[case("/", DEFAULT_SOURCE)]
    fn test_missing_source_hint(#[case] path: &str, #[case] name: &str) {
        assert_eq!(
            missing_source_hint(Path::new(path)),
            format!("Please place your \"{name}\" file in the project root.")
        );
    }

    #[test]
    fn test_missing_source_fails_with_hint() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("refs").join("my.bib");
        let output = dir.path().join("out");

        let err = run_import(input.clone(), output.clone(), None, false, false).unwrap_err();
        assert_eq!(
            failure_lines(&err),
            vec![
                format!("Error: BibTeX file not found at {}", input.display()),
                "Please place your \"my.bib\" file in the project root.".to_string(),
            ]
        );
        assert!(!output.exists());

        let result = run_import(input, output, None, false, false);
        assert_eq!(finish(result), 1);
    }

    #[test]
    fn test_other_failures_have_no_hint() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(failure_lines(&err), vec!["Error: boom".to_string()]);
        assert_eq!(finish(Err(err)), 1);
    }

    #[test]
    fn test_successful_import_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("citations.bib");
        std::fs::write(&input, "@article{a, title = {A}, year = 2020}").unwrap();

        let result = run_import(input, dir.path().join("out"), None, false, false);
        assert_eq!(finish(result), 0);
        assert!(dir.path().join("out").join("2020-unknown-a.md").is_file());
    }
}
