//! CLI module for the scriptest harness
//!
//! ## Commands
//!
//! - `list` - Discover tests through the runner script and print them
//! - `run` - Discover and run tests (pytest-style)
//! - `exec <file>` - Run one script through the harness, without discovery
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Every harness option has an environment variable
//! fallback so CI jobs can configure the harness without long command lines.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{BuildProfile, DEFAULT_RUNNER_FLAGS, ExecutorKind, HarnessConfig};
use crate::error::HarnessError;
use crate::exec::ExitCode;
use crate::session::SessionOptions;
use crate::version::SCRIPTEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl From<HarnessError> for CliError {
    /// Render through miette so codes, help text and source chains are shown.
    fn from(err: HarnessError) -> Self {
        CliError::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Test harness for a Lua interpreter
#[derive(Parser, Debug)]
#[command(name = "scriptest")]
#[command(version = SCRIPTEST_VERSION)]
#[command(about = "Discover and run interpreter test scripts", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub harness: HarnessArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct HarnessArgs {
    /// Root of the interpreter source tree
    #[arg(long, global = true, env = "SCRIPTEST_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Interpreter build to test
    #[arg(long, global = true, env = "SCRIPTEST_PROFILE", value_enum, default_value_t = BuildProfile::Release)]
    pub profile: BuildProfile,

    /// Interpreter path (overrides --profile)
    #[arg(long, global = true, env = "SCRIPTEST_INTERPRETER", value_name = "PATH")]
    pub interpreter: Option<PathBuf>,

    /// Tests directory (default: <root>/tests)
    #[arg(long, global = true, env = "SCRIPTEST_TESTS_DIR", value_name = "DIR")]
    pub tests_dir: Option<PathBuf>,

    /// Flags passed to the runner script
    #[arg(
        long,
        global = true,
        env = "SCRIPTEST_FLAGS",
        default_value = DEFAULT_RUNNER_FLAGS,
        allow_hyphen_values = true
    )]
    pub flags: String,

    /// Discovery report path (default: <tests>/discovery.txt)
    #[arg(long, global = true, env = "SCRIPTEST_REPORT", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Directory for overflow fixtures (default: system temp dir)
    #[arg(long, global = true, env = "SCRIPTEST_FIXTURE_DIR", value_name = "DIR")]
    pub fixture_dir: Option<PathBuf>,
}

/// Options that pick and tune the executor.
#[derive(Args, Debug, Clone, Copy)]
pub struct ExecArgs {
    /// Load the interpreter as a library and call its main in-process
    #[arg(long)]
    pub in_process: bool,

    /// Kill interpreter runs after this many seconds (child-process runs only)
    #[arg(long, value_name = "SECS", env = "SCRIPTEST_TIMEOUT")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover tests and print them
    List,

    /// Discover and run tests (pytest-style)
    Run {
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Stop on first failure
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
        /// Filter tests by keyword
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
        /// Skip the overflow variants
        #[arg(long)]
        no_overflow: bool,
        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Run one script through the harness, without discovery
    Exec {
        /// Test script to run
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Run the overflow variant
        #[arg(long)]
        overflow: bool,
        #[command(flatten)]
        exec: ExecArgs,
    },
}

impl HarnessArgs {
    /// Build the harness configuration these arguments describe.
    pub fn to_config(&self, exec: Option<ExecArgs>) -> HarnessConfig {
        let mut config = HarnessConfig::new()
            .with_root(&self.root)
            .with_profile(self.profile)
            .with_runner_flags(self.flags.clone());
        config.interpreter = self.interpreter.clone();
        config.tests_dir = self.tests_dir.clone();
        config.report_path = self.report.clone();
        config.fixture_dir = self.fixture_dir.clone();

        if let Some(exec) = exec {
            match (exec.in_process, exec.timeout) {
                (true, Some(secs)) => {
                    tracing::warn!(timeout_secs = secs, "--timeout has no effect on in-process runs; ignoring it");
                    config = config.with_executor(ExecutorKind::InProcess);
                }
                (true, None) => config = config.with_executor(ExecutorKind::InProcess),
                (false, Some(secs)) => config = config.with_timeout(Duration::from_secs(secs)),
                (false, None) => {}
            }
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::List => commands::list_tests(&cli.harness.to_config(None)),
        Command::Run {
            verbose,
            stop_on_fail,
            filter,
            no_overflow,
            exec,
        } => {
            let options = SessionOptions {
                filter,
                stop_on_fail,
                skip_overflow: no_overflow,
            };
            commands::run_tests(&cli.harness.to_config(Some(exec)), &options, verbose)
        }
        Command::Exec { file, overflow, exec } => {
            commands::exec_file(&cli.harness.to_config(Some(exec)), &file, overflow)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
