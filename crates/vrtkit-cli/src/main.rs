use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vrtkit_core::{AnalysisError, DecodeOptions, Report, SourceError};

const EXAMPLES: &str = "Examples:\n  vrtkit capture analyse capture.vrt -o report.json\n  vrtkit capture analyze capture.vrt --stdout --pretty\n  vrtkit capture analyse 'captures/*.vrt' -o report.json --reference-level -20";

#[derive(Parser, Debug)]
#[command(name = "vrtkit")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VRTKIT_BUILD_COMMIT"),
    " ",
    env!("VRTKIT_BUILD_DATE"),
    ")"
))]
#[command(
    about = "Decoder and stream analyzer for VITA-49 style IQ captures.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on capture files of big-endian 32-bit words.
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Decode every packet of a capture and write a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(after_help = EXAMPLES)]
    Analyse(AnalyseArgs),
}

#[derive(Args, Debug)]
struct AnalyseArgs {
    /// Path (or glob matching one file) of a capture of back-to-back packets
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log each decoded packet to stderr
    #[arg(long)]
    verbose: bool,

    /// Exit with a non-zero code if the report lists issues
    #[arg(long)]
    strict: bool,

    /// List issues after analysis
    #[arg(long)]
    list_issues: bool,

    /// Reference level (dBm) applied before the first context packet
    #[arg(long, value_name = "DBM", allow_negative_numbers = true, default_value_t = 0.0)]
    reference_level: f64,

    /// Walk the formatted GPS slot of context packets even when its bit is clear
    #[arg(long)]
    reserved_geolocation_slot: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Capture { command } => match command {
            CaptureCommands::Analyse(args) => cmd_capture_analyse(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        let hint = match &err {
            AnalysisError::Source(SourceError::UnalignedLength { .. }) => {
                Some("captures must hold whole 32-bit words".to_string())
            }
            _ => None,
        };
        CliError::new(format!("capture analysis failed: {}", err), hint)
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_capture_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    init_tracing(args.quiet, args.verbose);

    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if args.stdout {
        None
    } else {
        let path = args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_from_input(&path, &input_abs)?;
        Some(path)
    };

    let options = decode_options(&args);
    debug!(input = %resolved_input.display(), ?options, "analysing capture");
    let rep = vrtkit_core::analyze_capture_file(&resolved_input, &options)?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!(report = %path.display(), "report written");
            if !args.quiet {
                eprintln!("OK: report written -> {}", path.display());
            }
        }
    }

    if args.list_issues && !args.quiet {
        print_issues(&rep);
    }
    if args.strict && !rep.issues.is_empty() {
        return Err(CliError::new(
            format!("{} issue(s) detected", rep.issues.len()),
            Some("use --list-issues to inspect".to_string()),
        ));
    }
    Ok(())
}

fn decode_options(args: &AnalyseArgs) -> DecodeOptions {
    let options = DecodeOptions::default().with_reference_level(args.reference_level);
    if args.reserved_geolocation_slot {
        options.with_reserved_geolocation()
    } else {
        options
    }
}

fn ensure_distinct_from_input(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => fs::canonicalize("."),
        Some(parent) => fs::canonicalize(parent),
        None => return Ok(()),
    };
    // A missing output directory is created later and cannot hold the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_issues(rep: &Report) {
    eprintln!("Issues:");
    for issue in &rep.issues {
        eprintln!(
            "  word {} {}: {}",
            issue.word_offset, issue.severity, issue.message
        );
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    let meta = fs::metadata(input).map_err(|_| {
        CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a capture file of big-endian 32-bit words".to_string()),
        )
    })?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a capture file of big-endian 32-bit words".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
