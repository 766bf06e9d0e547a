//! Benford CLI - drive the analysis service from the command line
//!
//! Mirrors the GUI workflow headless: list the server's files, upload a
//! local data file, run the analysis, and print each column's verdict
//! against Benford's law.

use anyhow::{bail, Context, Result};
use benford_workbench::client::ApiClient;
use benford_workbench::model::{AnalysisReport, AnalyzeRequest, ColumnStats, BENFORD_EXPECTED};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "benford-cli")]
#[command(about = "Benford's-Law analysis of tabular data via the analysis service")]
struct Cli {
    /// Base URL of the analysis service
    #[arg(
        long,
        env = "BENFORD_SERVER",
        default_value = "http://localhost:5000",
        global = true
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the files known to the server
    Files,

    /// List the supported analysis modes
    Extensions,

    /// Upload a local data file
    Upload {
        /// File to upload
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Analyze an uploaded file and print per-column statistics
    Analyze {
        /// Server-side file name (as shown by `files`)
        #[arg(short, long)]
        filename: String,

        /// Analysis mode; defaults to the first one the server offers
        #[arg(short, long)]
        ext: Option<String>,

        /// Only print this column, with its digit table
        #[arg(short, long)]
        column: Option<String>,

        /// Print the raw report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Upload a file, analyze it, and print the report in one go
    Check {
        /// File to upload and analyze
        #[arg(short, long)]
        file: PathBuf,

        /// Analysis mode; defaults to the first one the server offers
        #[arg(short, long)]
        ext: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let client = ApiClient::new(&cli.server);

    runtime.block_on(async {
        match cli.command {
            Commands::Files => {
                let files = client.list_files().await?;
                if files.is_empty() {
                    println!("No files on the server.");
                }
                for file in files {
                    println!("{}", file);
                }
            }
            Commands::Extensions => {
                for ext in client.list_extensions().await? {
                    println!("{}", ext);
                }
            }
            Commands::Upload { file } => {
                let name = client.upload(&file).await?;
                println!("Uploaded {}", name);
            }
            Commands::Analyze {
                filename,
                ext,
                column,
                json,
            } => {
                let ext = resolve_ext(&client, ext).await?;
                let report = client.analyze(&AnalyzeRequest { filename, ext }).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_report(&report, column.as_deref())?;
                }
            }
            Commands::Check { file, ext } => {
                let name = client.upload(&file).await?;
                println!("Uploaded {}", name);
                let ext = resolve_ext(&client, ext).await?;
                let report = client
                    .analyze(&AnalyzeRequest {
                        filename: name,
                        ext,
                    })
                    .await?;
                print_report(&report, None)?;
            }
        }
        Ok(())
    })
}

/// Use the given mode, or fall back to the first one the server offers.
async fn resolve_ext(client: &ApiClient, ext: Option<String>) -> Result<String> {
    if let Some(ext) = ext {
        return Ok(ext);
    }
    let extensions = client.list_extensions().await?;
    match extensions.into_iter().next() {
        Some(first) => Ok(first),
        None => bail!("server offers no analysis modes"),
    }
}

/// Print per-column verdicts, and the digit table for a single column when
/// one was requested.
fn print_report(report: &AnalysisReport, column: Option<&str>) -> Result<()> {
    let summary = &report.summary;
    println!(
        "{} ({}): {} columns, {} lines parsed, {} omitted, {} values",
        summary.filename,
        summary.ext,
        summary.header_size,
        summary.parsed_lines,
        summary.omitted_lines,
        summary.parsed_words,
    );
    println!();

    match column {
        Some(name) => {
            let stats = report
                .column_stats(name)
                .with_context(|| format!("no column named '{}' in the report", name))?;
            print_column(name, stats);
        }
        None => {
            println!("{:<24} {:>10} {:>10}", "Column", "p-value", "verdict");
            for (name, stats) in &report.stats {
                println!(
                    "{:<24} {:>10.4} {:>10}",
                    name,
                    stats.benford_p_value,
                    if stats.is_compliant() { "ok" } else { "OFF" },
                );
            }
        }
    }
    Ok(())
}

/// Digit-by-digit table for one column, next to the expected series.
fn print_column(name: &str, stats: &ColumnStats) {
    println!(
        "{}: p-value {:.4} ({})",
        name,
        stats.benford_p_value,
        if stats.is_compliant() {
            "Benford-compliant"
        } else {
            "not compliant"
        },
    );
    println!("{:>5} {:>10} {:>10}", "digit", "observed", "expected");
    for (i, (observed, expected)) in stats
        .lead_digit_freq
        .iter()
        .zip(BENFORD_EXPECTED.iter())
        .enumerate()
    {
        println!("{:>5} {:>10.1} {:>10.1}", i + 1, observed, expected);
    }
}
