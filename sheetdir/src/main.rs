use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use colored::*;
use rayon::prelude::*;
use sheetdir_core::{EnumeratorConfig, SheetEntry, SheetEnumerator, SheetTable};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod formatter;
mod resolve;

#[derive(Parser)]
#[command(name = "sheetdir")]
#[command(about = "List the worksheets of XLSX files without reading cell data", long_about = None)]
#[command(version)]
struct Cli {
    /// XLSX files or glob patterns
    #[arg(value_name = "FILE|GLOB", required = true)]
    files: Vec<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON array with one object per file
    Json,
    /// One CSV row per sheet
    Csv,
}

type Listing = (PathBuf, sheetdir_core::Result<Vec<SheetEntry>>);

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let batch_size = config.batch_size;
    let files = resolve::resolve_inputs(&cli.files)?;
    tracing::debug!(files = files.len(), "resolved inputs");

    let enumerator = SheetEnumerator::with_config(config);
    let listings: Vec<Listing> = files
        .into_par_iter()
        .map(|file| {
            let sheets = enumerator.enumerate_file(&file);
            (file, sheets)
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failures = print_listings(&mut out, cli.format, listings, batch_size)?;
    out.flush()?;

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EnumeratorConfig> {
    if let Some(config_path) = path {
        return EnumeratorConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Fall back to a config in the current directory if there is one
    let default_config_path = PathBuf::from("sheetdir.toml");
    if default_config_path.exists() {
        EnumeratorConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(EnumeratorConfig::default())
    }
}

/// Print the successful listings in order and report failures on stderr.
///
/// Returns the number of files that failed.
fn print_listings<W: Write>(
    out: &mut W,
    format: OutputFormat,
    listings: Vec<Listing>,
    batch_size: usize,
) -> Result<usize> {
    let mut failures = 0;
    match format {
        OutputFormat::Human => {
            for (file, result) in listings {
                match result {
                    Ok(rows) => {
                        let mut table = SheetTable::new(rows, batch_size);
                        formatter::write_human(out, &file, &mut table)?;
                    }
                    Err(err) => {
                        report_failure(&err);
                        failures += 1;
                    }
                }
            }
        }
        OutputFormat::Json => {
            let mut documents = Vec::new();
            for (file, result) in listings {
                match result {
                    Ok(rows) => {
                        let mut table = SheetTable::new(rows, batch_size);
                        documents.push(formatter::json_listing(&file, &mut table));
                    }
                    Err(err) => {
                        report_failure(&err);
                        failures += 1;
                    }
                }
            }
            formatter::write_json(out, &documents)?;
        }
        OutputFormat::Csv => {
            let mut writer = formatter::csv_writer(out)?;
            for (file, result) in listings {
                match result {
                    Ok(rows) => {
                        let mut table = SheetTable::new(rows, batch_size);
                        formatter::write_csv(&mut writer, &file, &mut table)?;
                    }
                    Err(err) => {
                        report_failure(&err);
                        failures += 1;
                    }
                }
            }
            writer.flush()?;
        }
    }
    Ok(failures)
}

fn report_failure(err: &sheetdir_core::Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdir_core::Error;

    fn listing(file: &str, names: &[&str]) -> Listing {
        let rows = names
            .iter()
            .enumerate()
            .map(|(index, name)| SheetEntry {
                name: name.to_string(),
                index: index as i64,
            })
            .collect();
        (PathBuf::from(file), Ok(rows))
    }

    fn failed(file: &str) -> Listing {
        let path = PathBuf::from(file);
        (path.clone(), Err(Error::NoSheetsFound { path }))
    }

    #[test]
    fn test_csv_keeps_order_and_counts_failures() {
        let listings = vec![
            listing("a.xlsx", &["One"]),
            failed("broken.xlsx"),
            listing("b.xlsx", &["Two", "Three"]),
        ];
        let mut out = Vec::new();
        let failures = print_listings(&mut out, OutputFormat::Csv, listings, 1).unwrap();
        assert_eq!(failures, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "file,sheet_name,sheet_index\na.xlsx,One,0\nb.xlsx,Two,0\nb.xlsx,Three,1\n"
        );
    }

    #[test]
    fn test_json_skips_failed_files() {
        let listings = vec![failed("broken.xlsx"), listing("a.xlsx", &["One"])];
        let mut out = Vec::new();
        let failures = print_listings(&mut out, OutputFormat::Json, listings, 2048).unwrap();
        assert_eq!(failures, 1);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let documents = value.as_array().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["file"], "a.xlsx");
        assert_eq!(documents[0]["sheets"][0]["name"], "One");
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "batch_size = 16\n").unwrap();
        assert_eq!(load_config(Some(path.as_path())).unwrap().batch_size, 16);

        let missing = dir.path().join("missing.toml");
        let err = load_config(Some(missing.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from(["sheetdir", "-vv", "--format", "csv", "a.xlsx", "*.xlsx"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, OutputFormat::Csv));
        assert_eq!(cli.files, ["a.xlsx", "*.xlsx"]);
        assert!(Cli::try_parse_from(["sheetdir"]).is_err());
    }
}
