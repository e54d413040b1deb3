mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use querysnap_core::{CaptureCollection, CaptureSet, Error as CoreError, QueryCapture, QuerySpec};
use querysnap_report::{BufferSink, IoSink, MarkdownSink, Reporter};
use thiserror::Error;
use uuid::Uuid;

use logging::init_file_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("golden mismatch: {0}")]
    GoldenMismatch(String),
}

#[derive(Parser, Debug)]
#[command(name = "querysnap", version, about = "Golden query report harness")]
struct Cli {
    /// Optional NDJSON log file; markdown output is never written here.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a capture set as a markdown report.
    Render(RenderArgs),
    /// Render a capture set and compare it byte-for-byte against a golden
    /// file.
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Capture set JSON produced by a recording run.
    #[arg(long, value_name = "FILE")]
    captures: PathBuf,
    /// Output markdown file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Keep engine-returned result order instead of sorting.
    #[arg(long, default_value_t = false)]
    no_sort: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[arg(long, value_name = "FILE")]
    captures: PathBuf,
    /// Approved golden markdown file.
    #[arg(long, value_name = "FILE")]
    golden: PathBuf,
    #[arg(long, default_value_t = false)]
    no_sort: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_file_logging(path)?;
    }
    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    tracing::info!(event = "run_started", run_id = %run_id, started_at = %started_at.to_rfc3339());

    let result = match cli.command {
        Command::Render(args) => run_render(args),
        Command::Verify(args) => run_verify(args),
    };

    match &result {
        Ok(()) => tracing::info!(event = "run_finished", run_id = %run_id, status = "success"),
        Err(err) => {
            tracing::error!(event = "run_finished", run_id = %run_id, status = "error", error = %err);
        }
    }
    result
}

fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let set = load_captures(&args.captures)?;
    match args.out {
        Some(path) => {
            let file = fs::File::create(&path)?;
            render_captures_into(&set, !args.no_sort, IoSink::new(file))?;
            tracing::info!(event = "report_written", path = %path.display());
        }
        None => {
            render_captures_into(&set, !args.no_sort, IoSink::new(std::io::stdout().lock()))?;
        }
    }
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), CliError> {
    let set = load_captures(&args.captures)?;
    let markdown = render_captures(&set, !args.no_sort)?;
    let golden = fs::read_to_string(&args.golden)?;

    match first_divergence(&markdown, &golden) {
        None => {
            tracing::info!(event = "golden_verified", golden = %args.golden.display());
            Ok(())
        }
        Some(divergence) => {
            tracing::warn!(event = "golden_diverged", golden = %args.golden.display());
            Err(CliError::GoldenMismatch(divergence))
        }
    }
}

fn load_captures(path: &Path) -> Result<CaptureSet, CliError> {
    let contents = fs::read_to_string(path)?;
    Ok(CaptureSet::from_json(&contents)?)
}

/// Full report as a string, for golden comparison and tests.
fn render_captures(set: &CaptureSet, sort_results: bool) -> Result<String, CliError> {
    Ok(render_captures_into(set, sort_results, BufferSink::new())?.contents())
}

/// Render every capture in the set, one numbered section per query, through
/// a single reporter so section numbers keep increasing across queries.
fn render_captures_into<S: MarkdownSink>(
    set: &CaptureSet,
    sort_results: bool,
    sink: S,
) -> Result<S, CliError> {
    let coll = CaptureCollection::new(set.clone());
    let mut reporter = Reporter::new(sink);
    for capture in &set.captures {
        let spec = capture.spec();
        let title = match &spec {
            QuerySpec::Aggregation { .. } => format!("Aggregation against {}", set.collection),
            QuerySpec::Distinct { .. } => format!("Distinct against {}", set.collection),
        };
        reporter.section(&title)?;
        reporter.render_spec(&coll, &spec, sort_results)?;
    }
    Ok(reporter.into_sink())
}

/// First line where the rendered report and the golden file differ.
fn first_divergence(actual: &str, golden: &str) -> Option<String> {
    let mut actual_lines = actual.lines();
    let mut golden_lines = golden.lines();
    let mut number = 0usize;
    loop {
        number += 1;
        match (actual_lines.next(), golden_lines.next()) {
            (None, None) => return None,
            (rendered, approved) if rendered == approved => {}
            (rendered, approved) => {
                return Some(format!(
                    "line {number}: rendered {:?}, golden {:?}",
                    rendered.unwrap_or("<end of output>"),
                    approved.unwrap_or("<end of file>")
                ));
            }
        }
    }
}
