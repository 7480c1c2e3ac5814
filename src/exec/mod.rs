//! Interpreter execution strategies
//!
//! Two interchangeable [`Executor`]s run one interpreter invocation:
//!
//! - [`OutOfProcessExecutor`] spawns the interpreter and relays its output line by line (the default).
//! - [`InProcessExecutor`] loads the interpreter as a library and calls its `main` on the current thread, which
//!   keeps everything in one process when a native debugger is attached.
//!
//! Both take the same [`ExecutionRequest`] and tokenize its argument string with the same rules, so a request
//! means the same thing whichever strategy runs it.

pub mod console;
pub mod in_process;
pub mod out_of_process;

use std::future::Future;
use std::io;
use std::path::PathBuf;

pub use console::{Captured, Console};
pub use in_process::InProcessExecutor;
pub use out_of_process::OutOfProcessExecutor;

use crate::config::{ExecutorKind, HarnessConfig};
use crate::error::{HarnessError, HarnessResult};

/// Exit code reported by an interpreter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// Parameters of one interpreter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Interpreter executable (or shared library, in-process)
    pub program: PathBuf,
    /// Command line after the program name, quoted like a POSIX shell would expect
    pub arguments: String,
    pub working_dir: PathBuf,
}

impl ExecutionRequest {
    pub fn new(program: impl Into<PathBuf>, arguments: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            arguments: arguments.into(),
            working_dir: working_dir.into(),
        }
    }
}

/// Run one interpreter invocation to completion.
pub trait Executor {
    /// Execute the request and return the interpreter's exit code.
    ///
    /// An `Err` means the interpreter could not be run at all; a non-zero [`ExitCode`] means it ran and failed.
    fn execute(&self, request: &ExecutionRequest) -> HarnessResult<ExitCode>;
}

/// Build the executor selected by `config`.
pub fn executor_for(config: &HarnessConfig, console: Console) -> Box<dyn Executor> {
    match config.executor {
        ExecutorKind::OutOfProcess => {
            let mut executor = OutOfProcessExecutor::new(console);
            if let Some(timeout) = config.timeout {
                executor = executor.with_timeout(timeout);
            }
            Box::new(executor)
        }
        ExecutorKind::InProcess => {
            if let Some(timeout) = config.timeout {
                tracing::warn!(?timeout, "in-process runs cannot be timed out; ignoring the timeout");
            }
            Box::new(InProcessExecutor::new())
        }
    }
}

/// Split an argument string into an argument vector.
pub fn split_arguments(arguments: &str) -> HarnessResult<Vec<String>> {
    shell_words::split(arguments).map_err(|source| HarnessError::Arguments {
        arguments: arguments.to_string(),
        source,
    })
}

/// Drive `future` on a fresh current-thread runtime.
///
/// Each execution gets its own runtime, so the harness stays synchronous at its edges.
pub(crate) fn block_on<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
