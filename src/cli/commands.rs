use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::batch::{BatchReport, OutputTarget, Progress, collect_sources, run_batch};
use crate::filters::parse_date;
use crate::logging::init_logging;
use crate::models::Statistics;
use crate::session::RecoveryOptions;
use crate::utils::{format_path_with_tilde, format_thousands, resolve_output_dir};

#[derive(Parser)]
#[command(name = "chatlog-recovery")]
#[command(version = "0.1.0")]
#[command(about = "Recover readable chat text from damaged binary chat logs", long_about = None)]
pub struct Cli {
    /// Log decoding details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recover chat text from log files or directories of logs
    Recover(RecoverArgs),
    /// Decode logs and print statistics without writing any output
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct FilterArgs {
    /// Keep records on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<String>,

    /// Keep records on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub before: Option<String>,

    /// Keep records whose speaker or text contains this phrase (case-insensitive)
    #[arg(long, default_value = "")]
    pub phrase: String,

    /// Treat --phrase as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Also emit truncated, empty and corrupt-timestamp records, with markers
    #[arg(long)]
    pub keep_damaged: bool,
}

impl FilterArgs {
    fn to_options(&self) -> Result<RecoveryOptions> {
        let after = self.after.as_deref().map(parse_date).transpose()?;
        let before = self.before.as_deref().map(parse_date).transpose()?;
        let options = RecoveryOptions::new(after, before, &self.phrase, self.regex, self.keep_damaged)?;
        Ok(options)
    }
}

#[derive(Args)]
pub struct RecoverArgs {
    /// Log files or directories to recover
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Directory for recovered text (default: $CHATLOG_RECOVERY_OUTPUT_DIR, else next to each log)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Only pick files with this extension when walking directories
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Do not show progress
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Log files or directories to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only pick files with this extension when walking directories
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::Recover(args)) => {
            recover(args)?;
        }
        Some(Commands::Stats(args)) => {
            show_stats(args)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn recover(args: &RecoverArgs) -> Result<()> {
    let options = args.filter.to_options()?;
    let sources = collect_sources(&args.paths, args.extension.as_deref())?;

    let output_dir = resolve_output_dir(args.output_dir.clone());
    if let Some(dir) = &output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let show_progress = !args.quiet && io::stderr().is_terminal();
    let report = run_batch(&sources, &OutputTarget::Files { output_dir }, &options, |progress| {
        if show_progress {
            print_progress(progress);
        }
    });
    if show_progress {
        eprintln!();
    }

    println!("Chat Log Recovery");
    println!("================================");
    for file in &report.files {
        match &file.destination {
            Some(destination) => println!(
                "{} -> {} ({} records)",
                format_path_with_tilde(&file.source),
                format_path_with_tilde(destination),
                format_thousands(file.statistics.emitted_records)
            ),
            None => println!("{} -> no output", format_path_with_tilde(&file.source)),
        }
    }
    println!();
    print_totals(&report);

    into_result(report)
}

fn show_stats(args: &StatsArgs) -> Result<()> {
    let options = args.filter.to_options()?;
    let sources = collect_sources(&args.paths, args.extension.as_deref())?;
    let report = run_batch(&sources, &OutputTarget::Discard, &options, |_| {});

    if args.json {
        let json = JsonReport::from_report(&report);
        println!("{}", serde_json::to_string_pretty(&json).context("Failed to serialize report")?);
    } else {
        println!("Chat Log Statistics");
        println!("================================");
        print_totals(&report);
    }

    into_result(report)
}

fn print_progress(progress: &Progress<'_>) {
    eprint!(
        "\r[{:>5.1}%] {}/{} {}",
        progress.percent(),
        progress.file_index + 1,
        progress.file_count,
        format_path_with_tilde(progress.source)
    );
}

fn print_totals(report: &BatchReport) {
    println!("Files processed: {}", format_thousands(report.files.len() as u64));
    for line in report.totals.summary_lines() {
        println!("  {}", line);
    }
}

/// Turns a failed batch into an error after its partial report was printed
fn into_result(report: BatchReport) -> Result<()> {
    match report.failure {
        Some(failure) => {
            let source = format_path_with_tilde(&failure.source);
            Err(anyhow::Error::new(failure.error).context(format!("Failed to recover {}", source)))
        }
        None => Ok(()),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile<'a>>,
    totals: &'a Statistics,
    emitted_bytes: String,
    failure: Option<String>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    source: String,
    statistics: &'a Statistics,
}

impl<'a> JsonReport<'a> {
    fn from_report(report: &'a BatchReport) -> Self {
        Self {
            files: report
                .files
                .iter()
                .map(|file| JsonFile {
                    source: file.source.display().to_string(),
                    statistics: &file.statistics,
                })
                .collect(),
            totals: &report.totals,
            emitted_bytes: report.totals.emitted_bytes().to_string(),
            failure: report
                .failure
                .as_ref()
                .map(|f| format!("{}: {}", f.source.display(), f.error)),
        }
    }
}
