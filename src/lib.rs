#![deny(unsafe_code)]
//! scriptest: a test harness for a Lua interpreter
//!
//! The interpreter reports its own test set: the runner script lists every test (and every skip) in `--list`
//! mode, and runs a single test file otherwise. This crate discovers cases from that listing, runs each one as
//! its own interpreter invocation and reports pass/fail from the exit code.
//!
//! ## Layout
//!
//! - [`discovery`]: run the listing and turn it into [`TestCase`]s
//! - [`runner`]: run one case, synthesizing an overflow fixture first when asked to
//! - [`exec`]: the two execution strategies (child process, or in-process `main` call)
//! - [`session`]: sequential session driver plus the console reporter
//! - [`cli`]: the `scriptest` command
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` with `?` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Unsafe code**: denied crate-wide; only `exec::in_process` opts back in, for the FFI call.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exec;
pub mod fixture;
pub mod runner;
pub mod session;
pub mod version;

pub use scriptest_core::{ListingLine, TestCase, TestOptions, parse_listing_line};

pub use config::{BuildProfile, ExecutorKind, HarnessConfig};
pub use discovery::{ListingDiscovery, TestDiscovery, discover};
pub use error::{HarnessError, HarnessResult};
pub use exec::{Console, ExecutionRequest, Executor, ExitCode, InProcessExecutor, OutOfProcessExecutor};
pub use runner::TestCaseRunner;
pub use session::{ConsoleReporter, SessionOptions, TestReporter, TestResult, TestSummary, run_session};
