//! Test discovery through the interpreter's own listing.
//!
//! The runner script knows which tests exist and which ones the current build should skip, so instead of
//! scanning the filesystem we run it with `--list` and parse what it prints (see [`scriptest_core::listing`]).
//!
//! Every stdout line is mirrored to the discovery report. stderr is collected on the side and only surfaces if
//! the listing run fails, in which case it is appended to the report and carried by the error.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use scriptest_core::{TestCase, parse_listing_line};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::exec::out_of_process::read_lines;
use crate::exec::{ExecutionRequest, block_on, split_arguments};

/// Produce the list of test cases to run.
pub trait TestDiscovery {
    /// Discover every test case, in listing order.
    ///
    /// Either the whole list is returned or an error is; a partial list is never usable.
    fn discover(&self) -> HarnessResult<Vec<TestCase>>;
}

/// Discovery by running the runner script in `--list` mode.
pub struct ListingDiscovery<'a> {
    config: &'a HarnessConfig,
}

impl<'a> ListingDiscovery<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self { config }
    }
}

impl TestDiscovery for ListingDiscovery<'_> {
    #[tracing::instrument(skip_all)]
    fn discover(&self) -> HarnessResult<Vec<TestCase>> {
        let config = self.config.resolved()?;
        let request = listing_request(&config);
        let args = split_arguments(&request.arguments)?;
        tracing::debug!(program = %request.program.display(), ?args, "running listing");

        let listing = block_on(capture_listing(&request, args))??;

        let base_dir = config.runner_dir();
        let tests_dir = config.tests_dir();

        let mut report = Report::create(config.report_path())?;
        for line in &listing.lines {
            report.write_line(line)?;
        }
        if listing.exit_code != 0 {
            report.write_line(&listing.stderr)?;
            report.finish()?;
            return Err(HarnessError::Discovery {
                exit_code: listing.exit_code,
                stderr: listing.stderr,
            });
        }
        report.finish()?;

        let mut cases = Vec::with_capacity(listing.lines.len() * 2);
        for line in &listing.lines {
            let parsed = parse_listing_line(line)?;
            cases.extend(TestCase::expand(&parsed, &base_dir, &tests_dir));
        }
        tracing::info!(
            entries = listing.lines.len(),
            cases = cases.len(),
            "discovered tests"
        );
        Ok(cases)
    }
}

/// Discover with the default listing strategy.
pub fn discover(config: &HarnessConfig) -> HarnessResult<Vec<TestCase>> {
    ListingDiscovery::new(config).discover()
}

fn listing_request(config: &HarnessConfig) -> ExecutionRequest {
    ExecutionRequest::new(
        config.interpreter_path(),
        config.listing_arguments(),
        config.runner_dir(),
    )
}

struct ListingOutput {
    lines: Vec<String>,
    stderr: String,
    exit_code: i32,
}

async fn capture_listing(request: &ExecutionRequest, args: Vec<String>) -> HarnessResult<ListingOutput> {
    let mut child = Command::new(&request.program)
        .args(&args)
        .current_dir(&request.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| HarnessError::Spawn {
            program: request.program.clone(),
            source,
        })?;

    // stderr is drained concurrently so a chatty listing cannot block on a full pipe.
    let stderr_task = child.stderr.take().map(|mut stream| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await.map(|_| buf)
        })
    });

    let mut lines = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        read_lines(stdout, |line| lines.push(line.to_string())).await?;
    }

    let status = child.wait().await?;
    let stderr = match stderr_task {
        Some(task) => task.await.map_err(io::Error::other)??,
        None => Vec::new(),
    };

    Ok(ListingOutput {
        lines,
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: status.code().unwrap_or(-1),
    })
}

/// Discovery report file, truncated on every discovery run.
struct Report {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Report {
    fn create(path: PathBuf) -> HarnessResult<Self> {
        match File::create(&path) {
            Ok(file) => Ok(Self {
                path,
                writer: BufWriter::new(file),
            }),
            Err(source) => Err(HarnessError::Report { path, source }),
        }
    }

    fn write_line(&mut self, line: &str) -> HarnessResult<()> {
        writeln!(self.writer, "{line}").map_err(|source| self.error(source))
    }

    fn finish(mut self) -> HarnessResult<()> {
        self.writer.flush().map_err(|source| self.error(source))
    }

    fn error(&self, source: io::Error) -> HarnessError {
        HarnessError::Report {
            path: self.path.clone(),
            source,
        }
    }
}

/// Render cases the way `scriptest list` prints them.
pub fn render_cases(cases: &[TestCase]) -> String {
    let mut out = String::new();
    for case in cases {
        out.push_str(case.display_name());
        if !case.category().is_empty() {
            out.push_str(&format!(" [{}]", case.category()));
        }
        if case.is_skipped() {
            if case.skip_reason().is_empty() {
                out.push_str(" SKIPPED");
            } else {
                out.push_str(&format!(" SKIPPED ({})", case.skip_reason()));
            }
        }
        out.push('\n');
    }
    out
}

/// Paths of the distinct scripts behind `cases`, in first-seen order.
pub fn distinct_paths(cases: &[TestCase]) -> Vec<&Path> {
    let mut seen: HashSet<&Path> = HashSet::new();
    cases
        .iter()
        .map(TestCase::path)
        .filter(|path| seen.insert(*path))
        .collect()
}
