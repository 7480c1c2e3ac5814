//! Harness configuration
//!
//! Everything the harness needs to locate the interpreter and its test scripts. The layout mirrors a LuaJIT
//! source tree:
//!
//! ```text
//! <root>/bin/x64/<Profile>/luajit[.exe]   interpreter under test
//! <root>/tests/test/test.lua              listing + runner script
//! <root>/tests/discovery.txt              discovery report
//! ```
//!
//! Every interpreter run happens inside `<tests>/test`, so relative paths only mean something once they are
//! anchored at the harness's own working directory. Discovery and the runner work on [`HarnessConfig::resolved`].

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use scriptest_core::paths;

/// Flags passed to the runner script for both discovery and execution.
pub const DEFAULT_RUNNER_FLAGS: &str = "+dse +fold +fwd +fuse +loop +sink +slow";

/// Marker appended to the runner arguments to request a listing instead of a run.
pub const LIST_FLAG: &str = "--list";

/// Which interpreter build to test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BuildProfile {
    #[default]
    Release,
    Debug,
    /// Unmodified upstream build, kept around for comparison runs.
    Orig,
}

impl BuildProfile {
    pub fn dir_name(self) -> &'static str {
        match self {
            BuildProfile::Release => "Release",
            BuildProfile::Debug => "Debug",
            BuildProfile::Orig => "Orig",
        }
    }
}

/// How test scripts are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExecutorKind {
    /// Spawn the interpreter as a child process.
    #[default]
    OutOfProcess,
    /// Load the interpreter as a library and call its `main` directly. Handy under a native debugger.
    InProcess,
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Root of the interpreter's source tree
    pub root: PathBuf,
    /// Build whose binary is tested, unless `interpreter` overrides it
    pub profile: BuildProfile,
    /// Explicit interpreter path
    pub interpreter: Option<PathBuf>,
    /// Explicit tests directory (default `<root>/tests`)
    pub tests_dir: Option<PathBuf>,
    /// Opaque flag string passed to the runner script
    pub runner_flags: String,
    pub executor: ExecutorKind,
    /// Kill out-of-process runs that take longer than this
    pub timeout: Option<Duration>,
    /// Where overflow fixtures are written (default: the system temp dir)
    pub fixture_dir: Option<PathBuf>,
    /// Explicit discovery report path
    pub report_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            profile: BuildProfile::default(),
            interpreter: None,
            tests_dir: None,
            runner_flags: DEFAULT_RUNNER_FLAGS.to_string(),
            executor: ExecutorKind::default(),
            timeout: None,
            fixture_dir: None,
            report_path: None,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_profile(mut self, profile: BuildProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn with_tests_dir(mut self, tests_dir: impl Into<PathBuf>) -> Self {
        self.tests_dir = Some(tests_dir.into());
        self
    }

    pub fn with_runner_flags(mut self, flags: impl Into<String>) -> Self {
        self.runner_flags = flags.into();
        self
    }

    pub fn with_executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Anchor every relative path at `cwd`.
    ///
    /// A bare interpreter name such as `luajit` is left alone so the platform can still look it up on `PATH`
    /// (or the loader on its library path).
    pub fn resolve_against(mut self, cwd: &Path) -> Self {
        self.root = paths::absolutize(&self.root, cwd);
        self.interpreter = self.interpreter.map(|program| resolve_program(&program, cwd));
        self.tests_dir = self.tests_dir.map(|dir| paths::absolutize(&dir, cwd));
        self.fixture_dir = self.fixture_dir.map(|dir| paths::absolutize(&dir, cwd));
        self.report_path = self.report_path.map(|path| paths::absolutize(&path, cwd));
        self
    }

    /// This config with every relative path anchored at the current working directory.
    pub fn resolved(&self) -> io::Result<Self> {
        Ok(self.clone().resolve_against(&env::current_dir()?))
    }

    /// Path of the interpreter executable (or library, in-process).
    pub fn interpreter_path(&self) -> PathBuf {
        if let Some(path) = &self.interpreter {
            return path.clone();
        }
        self.root
            .join("bin")
            .join(arch_dir())
            .join(self.profile.dir_name())
            .join(format!("luajit{}", env::consts::EXE_SUFFIX))
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.tests_dir.clone().unwrap_or_else(|| self.root.join("tests"))
    }

    /// Working directory for every interpreter run.
    pub fn runner_dir(&self) -> PathBuf {
        self.tests_dir().join("test")
    }

    /// Script that both lists and runs tests.
    pub fn runner_script(&self) -> PathBuf {
        self.runner_dir().join("test.lua")
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| self.tests_dir().join("discovery.txt"))
    }

    /// Argument string for a discovery run.
    pub fn listing_arguments(&self) -> String {
        join_arguments(&self.runner_script(), &self.runner_flags, LIST_FLAG)
    }

    /// Argument string for running one test file.
    pub fn run_arguments(&self, test_file: &Path) -> String {
        join_arguments(&self.runner_script(), &self.runner_flags, &quote_path(test_file))
    }
}

fn join_arguments(script: &Path, flags: &str, last: &str) -> String {
    let mut parts = vec![quote_path(script)];
    if !flags.trim().is_empty() {
        parts.push(flags.trim().to_string());
    }
    parts.push(last.to_string());
    parts.join(" ")
}

fn resolve_program(program: &Path, cwd: &Path) -> PathBuf {
    if program.components().count() > 1 {
        paths::absolutize(program, cwd)
    } else {
        program.to_path_buf()
    }
}

fn quote_path(path: &Path) -> String {
    shell_words::quote(&path.to_string_lossy()).into_owned()
}

fn arch_dir() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "x86",
        other => other,
    }
}
