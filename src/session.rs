//! Test session (pytest-style)
//!
//! ## TestReporter Trait
//!
//! The session uses a `TestReporter` trait to separate reporting from execution. Custom output formats (JSON,
//! TAP, ...) only need a new implementation of the trait.
//!
//! ## Flow
//!
//! Discover every case, filter, then run the remaining cases one at a time. Skipped cases are reported and never
//! executed. A failing or erroring case is recorded and the session moves on, unless `stop_on_fail` is set.
//! Discovery errors abort the session before anything runs.

use std::time::{Duration, Instant};

use scriptest_core::{TestCase, TestOptions};

use crate::config::HarnessConfig;
use crate::discovery::TestDiscovery;
use crate::error::{HarnessError, HarnessResult};
use crate::exec::Executor;
use crate::runner::TestCaseRunner;

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called once discovery and filtering are done
    fn on_collection_complete(&mut self, test_count: usize);

    /// Called before a case runs (or is skipped)
    fn on_test_start(&mut self, _test: &TestCase) {}

    /// Called when a case completes
    fn on_test_complete(&mut self, test: &TestCase, result: &TestResult);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

/// Result of running a single case
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Passed(Duration),
    Failed(Duration, String),
    Skipped(String),
}

impl TestResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, TestResult::Failed(..))
    }
}

/// Summary of a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, result: &TestResult) {
        self.total += 1;
        match result {
            TestResult::Passed(_) => self.passed += 1,
            TestResult::Failed(..) => self.failed += 1,
            TestResult::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Session knobs
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Only run cases whose display name contains this keyword
    pub filter: Option<String>,
    /// Stop after the first failure
    pub stop_on_fail: bool,
    /// Drop `WithOverflow` cases
    pub skip_overflow: bool,
}

impl SessionOptions {
    fn accepts(&self, case: &TestCase) -> bool {
        if self.skip_overflow && case.options() == TestOptions::WithOverflow {
            return false;
        }
        match &self.filter {
            Some(keyword) => case.display_name().contains(keyword.as_str()),
            None => true,
        }
    }
}

/// Default console reporter (pytest-style)
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_collection_complete(&mut self, test_count: usize) {
        eprintln!("\x1b[1m=================== test session starts ===================\x1b[0m");
        if test_count == 0 {
            eprintln!("No tests collected");
        } else {
            eprintln!("collected {} item(s)", test_count);
        }
    }

    fn on_test_start(&mut self, test: &TestCase) {
        if self.verbose {
            eprintln!("{}::{} ...", test.category(), test.display_name());
        }
    }

    fn on_test_complete(&mut self, test: &TestCase, result: &TestResult) {
        let status = match result {
            TestResult::Passed(d) => format!("\x1b[32mPASSED\x1b[0m ({:.0}ms)", d.as_millis()),
            TestResult::Failed(d, _) => format!("\x1b[31mFAILED\x1b[0m ({:.0}ms)", d.as_millis()),
            TestResult::Skipped(reason) => {
                if reason.is_empty() {
                    "\x1b[33mSKIPPED\x1b[0m".to_string()
                } else {
                    format!("\x1b[33mSKIPPED\x1b[0m ({})", reason)
                }
            }
        };
        eprintln!("{}::{} {}", test.category(), test.display_name(), status);

        if let TestResult::Failed(_, error) = result {
            eprintln!("\x1b[31m{}\x1b[0m", error);
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        eprintln!();

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.skipped > 0 {
            parts.push(format!("{} skipped", summary.skipped));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        let color = if summary.is_success() { "\x1b[1;32m" } else { "\x1b[1;31m" };
        eprintln!(
            "{}====== {} in {:.2}s ======\x1b[0m",
            color,
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

/// Run a full session: discover, filter, execute, report.
///
/// ## Errors
/// Only discovery errors are returned; per-case errors become [`TestResult::Failed`].
pub fn run_session(
    config: &HarnessConfig,
    discovery: &dyn TestDiscovery,
    executor: &dyn Executor,
    reporter: &mut dyn TestReporter,
    options: &SessionOptions,
) -> HarnessResult<TestSummary> {
    let start_time = Instant::now();

    let cases: Vec<TestCase> = discovery
        .discover()?
        .into_iter()
        .filter(|case| options.accepts(case))
        .collect();
    reporter.on_collection_complete(cases.len());

    let runner = TestCaseRunner::new(config, executor);
    let mut summary = TestSummary::default();

    for case in &cases {
        reporter.on_test_start(case);
        let result = run_case(&runner, case);
        reporter.on_test_complete(case, &result);
        summary.record(&result);

        if options.stop_on_fail && result.is_failure() {
            tracing::info!(test = case.display_name(), "stopping after first failure");
            break;
        }
    }

    summary.duration = start_time.elapsed();
    reporter.on_run_complete(&summary);
    Ok(summary)
}

fn run_case(runner: &TestCaseRunner<'_>, case: &TestCase) -> TestResult {
    if case.is_skipped() {
        return TestResult::Skipped(case.skip_reason().to_string());
    }

    let start = Instant::now();
    match runner.run(case) {
        Ok(()) => TestResult::Passed(start.elapsed()),
        Err(err @ HarnessError::TestFailed { .. }) => TestResult::Failed(start.elapsed(), err.to_string()),
        Err(err) => {
            tracing::warn!(test = case.display_name(), %err, "test case could not be executed");
            TestResult::Failed(start.elapsed(), format!("error: {}", error_chain(&err)))
        }
    }
}

/// `err` followed by its sources, joined with `: `.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
