// crates/patternsmith-cli/src/main.rs
// ============================================================================
// Module: Patternsmith CLI
// Description: CLI entrypoint for configured pattern synthesis.
// Purpose: Generate artifacts, detect drift, and print analysis models.
// Dependencies: clap, patternsmith-cli, serde_json, tracing-subscriber
// ============================================================================

//! ## Overview
//! `patternsmith generate` writes every job's artifacts plus the run report,
//! `patternsmith check` fails when the output directory has drifted from a
//! fresh regeneration, and `patternsmith analyze --job NAME` prints one job's
//! classified surface or composition plan as JSON.
//!
//! Diagnostics go to stderr; command results go to stdout. Logging is
//! controlled by `PATTERNSMITH_LOG` (default `warn`).

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use patternsmith_cli::CliError;
use patternsmith_cli::InputOverrides;
use patternsmith_cli::RunInputs;
use patternsmith_cli::RunSummary;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "PATTERNSMITH_LOG";

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "patternsmith", version, about = "Synthesize structural pattern code from contracts.")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Input location flags shared by every subcommand.
#[derive(Debug, Args)]
struct InputArgs {
    /// Config file (defaults to $PATTERNSMITH_CONFIG, then ./patternsmith.toml).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Type catalog overriding `[catalog] path`.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Output directory overriding `[output] dir`.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

impl From<InputArgs> for InputOverrides {
    fn from(args: InputArgs) -> Self {
        Self {
            config: args.config,
            catalog: args.catalog,
            out: args.out,
        }
    }
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Run every job and write artifacts plus the run report.
    Generate {
        /// Input locations.
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Regenerate in memory and fail when outputs on disk differ.
    Check {
        /// Input locations.
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Print one job's analysis model and diagnostics as JSON.
    Analyze {
        /// Input locations.
        #[command(flatten)]
        inputs: InputArgs,
        /// Job to analyze.
        #[arg(long, value_name = "NAME")]
        job: String,
    },
}

// ============================================================================
// SECTION: Command Dispatch
// ============================================================================

/// CLI entrypoint.
fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => report_error(&err),
    }
}

/// Installs the stderr log subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).without_time().init();
}

/// Dispatches the CLI command.
fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            inputs,
        } => {
            let inputs = RunInputs::load(&inputs.into())?;
            let run = patternsmith_cli::generate(&inputs)?;
            report_diagnostics(&run)?;
            let written = run.artifacts().count();
            write_stdout(&format!(
                "wrote {written} artifact(s) to {}",
                inputs.output_dir.display()
            ))?;
            Ok(exit_code(run.is_clean()))
        }
        Command::Check {
            inputs,
        } => {
            let inputs = RunInputs::load(&inputs.into())?;
            let summary = patternsmith_cli::check(&inputs)?;
            report_diagnostics(&summary.run)?;
            for path in &summary.drifted {
                write_stderr(&format!("drift detected: {}", path.display()))?;
            }
            if summary.drifted.is_empty() {
                write_stdout("generated outputs are up to date")?;
            } else {
                write_stderr("run `patternsmith generate` to refresh generated outputs")?;
            }
            Ok(exit_code(summary.run.is_clean() && summary.drifted.is_empty()))
        }
        Command::Analyze {
            inputs,
            job,
        } => {
            let inputs = RunInputs::load(&inputs.into())?;
            let outcome = patternsmith_cli::analyze(&inputs, &job)?;
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|err| CliError::Serialization(err.to_string()))?;
            write_stdout(&json)?;
            Ok(exit_code(!outcome.has_errors()))
        }
    }
}

/// Prints every job's diagnostics and render failures to stderr.
fn report_diagnostics(run: &RunSummary) -> Result<(), CliError> {
    for outcome in &run.outcomes {
        for diagnostic in &outcome.diagnostics {
            write_stderr(&format!("[{}] {diagnostic}", outcome.job))?;
        }
    }
    for failure in &run.render_failures {
        write_stderr(&format!("[{}] render failed: {}", failure.job, failure.message))?;
    }
    Ok(())
}

/// Maps success to an exit code.
fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout(line: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{line}").map_err(|err| CliError::Invalid(format!("stdout: {err}")))
}

/// Writes one line to stderr.
fn write_stderr(line: &str) -> Result<(), CliError> {
    let mut stderr = std::io::stderr();
    writeln!(stderr, "{line}").map_err(|err| CliError::Invalid(format!("stderr: {err}")))
}

/// Reports a CLI error to stderr.
fn report_error(err: &CliError) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "error: {err}");
    ExitCode::FAILURE
}
