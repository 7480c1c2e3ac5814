//! Harness error type.
//!
//! Discovery and listing errors abort the whole run. Everything else is scoped to the test case that raised
//! it: the session records it as a failure and moves on to the next case.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use miette::Diagnostic;
use scriptest_core::ListingError;
use thiserror::Error;

/// Errors raised by discovery, fixtures and executors.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("test discovery failed (exit code {exit_code})\n{stderr}")]
    #[diagnostic(code(scriptest::discovery), help("the listing script's stderr is shown above"))]
    Discovery { exit_code: i32, stderr: String },

    #[error(transparent)]
    #[diagnostic(code(scriptest::listing))]
    Listing(#[from] ListingError),

    #[error("failed to start `{}`", program.display())]
    #[diagnostic(code(scriptest::spawn), help("check the interpreter path and build profile"))]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot split argument string `{arguments}`")]
    #[diagnostic(code(scriptest::arguments))]
    Arguments {
        arguments: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("argument contains an interior NUL byte: {argument:?}")]
    #[diagnostic(code(scriptest::arguments))]
    NulInArgument { argument: String },

    #[error("failed to load `{}` as a library", path.display())]
    #[diagnostic(code(scriptest::library))]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("`{}` has no `main` entry point", path.display())]
    #[diagnostic(code(scriptest::entry_point))]
    EntryPoint {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("cannot enter working directory `{}`", path.display())]
    #[diagnostic(code(scriptest::working_dir))]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` did not exit within {}s", program.display(), timeout.as_secs_f64())]
    #[diagnostic(code(scriptest::timeout))]
    TimedOut { program: PathBuf, timeout: Duration },

    #[error("failed to write overflow fixture for `{}`", source_path.display())]
    #[diagnostic(code(scriptest::fixture))]
    Fixture {
        source_path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write discovery report `{}`", path.display())]
    #[diagnostic(code(scriptest::report))]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{name}` is skipped and cannot be run: {reason}")]
    #[diagnostic(code(scriptest::not_runnable))]
    NotRunnable { name: String, reason: String },

    #[error("`{name}` failed with exit code {exit_code}")]
    #[diagnostic(code(scriptest::test_failed))]
    TestFailed { name: String, exit_code: i32 },

    #[error("I/O error: {0}")]
    #[diagnostic(code(scriptest::io))]
    Io(#[from] io::Error),
}

impl HarnessError {
    /// Whether the error should abort the whole run rather than a single case.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarnessError::Discovery { .. } | HarnessError::Listing(_) | HarnessError::Report { .. }
        )
    }
}

/// Result alias used across the harness.
pub type HarnessResult<T> = Result<T, HarnessError>;
