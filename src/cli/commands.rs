//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::env;
use std::path::Path;

use scriptest_core::{TestCase, TestOptions, paths};

use crate::config::HarnessConfig;
use crate::discovery::{self, ListingDiscovery, distinct_paths, render_cases};
use crate::error::HarnessError;
use crate::exec::{Console, ExitCode, executor_for};
use crate::runner::TestCaseRunner;
use crate::session::{ConsoleReporter, SessionOptions, run_session};

use super::{CliError, CliResult};

/// Discover tests and print one line per case.
pub fn list_tests(config: &HarnessConfig) -> CliResult<ExitCode> {
    let cases = discovery::discover(config)?;
    print!("{}", render_cases(&cases));
    eprintln!(
        "{} script(s), {} case(s); report written to {}",
        distinct_paths(&cases).len(),
        cases.len(),
        config.report_path().display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run a full session and fail if any case failed.
pub fn run_tests(config: &HarnessConfig, options: &SessionOptions, verbose: bool) -> CliResult<ExitCode> {
    let executor = executor_for(config, Console::stdout());
    let discovery = ListingDiscovery::new(config);
    let mut reporter = ConsoleReporter::new(verbose);

    let summary = run_session(config, &discovery, executor.as_ref(), &mut reporter, options)?;

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Run a single script as an ad-hoc test case.
pub fn exec_file(config: &HarnessConfig, file: &Path, overflow: bool) -> CliResult<ExitCode> {
    let cwd = env::current_dir().map_err(|e| CliError::failure(format!("Cannot read working directory: {}", e)))?;
    let options = if overflow {
        TestOptions::WithOverflow
    } else {
        TestOptions::None
    };
    let case = TestCase::new(paths::absolutize(file, &cwd), options, None, &config.tests_dir());

    let executor = executor_for(config, Console::stdout());
    match TestCaseRunner::new(config, executor.as_ref()).run(&case) {
        Ok(()) => {
            eprintln!("\x1b[32mPASSED\x1b[0m {}", case.display_name());
            Ok(ExitCode::SUCCESS)
        }
        Err(HarnessError::TestFailed { name, exit_code }) => Err(CliError::failure(format!(
            "\x1b[31mFAILED\x1b[0m {} (exit code {})",
            name, exit_code
        ))),
        Err(err) => Err(err.into()),
    }
}
