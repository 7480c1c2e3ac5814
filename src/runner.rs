//! Run a single discovered test case.

use std::path::PathBuf;

use scriptest_core::TestCase;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::exec::{ExecutionRequest, Executor};
use crate::fixture::write_overflow_fixture;

/// Turns a [`TestCase`] into an interpreter run and checks its exit code.
pub struct TestCaseRunner<'a> {
    config: &'a HarnessConfig,
    executor: &'a dyn Executor,
}

impl<'a> TestCaseRunner<'a> {
    pub fn new(config: &'a HarnessConfig, executor: &'a dyn Executor) -> Self {
        Self { config, executor }
    }

    /// Run `case` and require a zero exit code.
    ///
    /// ## Errors
    /// - [`HarnessError::NotRunnable`] for a skipped case; skipped cases are never executed.
    /// - [`HarnessError::TestFailed`] when the interpreter exits non-zero.
    /// - Any fixture or executor error, which fails only this case.
    #[tracing::instrument(skip_all, fields(test = case.display_name()))]
    pub fn run(&self, case: &TestCase) -> HarnessResult<()> {
        if case.is_skipped() {
            return Err(HarnessError::NotRunnable {
                name: case.display_name().to_string(),
                reason: case.skip_reason().to_string(),
            });
        }

        let config = self.config.resolved()?;
        let test_file = prepare_script(&config, case)?;
        let request = ExecutionRequest::new(
            config.interpreter_path(),
            config.run_arguments(&test_file),
            config.runner_dir(),
        );

        let code = self.executor.execute(&request)?;
        if code.is_success() {
            Ok(())
        } else {
            Err(HarnessError::TestFailed {
                name: case.display_name().to_string(),
                exit_code: code.0,
            })
        }
    }
}

fn prepare_script(config: &HarnessConfig, case: &TestCase) -> HarnessResult<PathBuf> {
    if case.options().with_overflow() {
        write_overflow_fixture(case.path(), config.fixture_dir.as_deref())
    } else {
        Ok(case.path().to_path_buf())
    }
}
