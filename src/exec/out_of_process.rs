//! Run the interpreter as a child process.
//!
//! stdout and stderr are each drained by their own task, and both tasks are running before we start waiting
//! on the child. Draining them one after the other would deadlock as soon as the child fills the pipe buffer
//! of the stream nobody is reading.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::{Console, ExecutionRequest, Executor, ExitCode, block_on, split_arguments};
use crate::error::{HarnessError, HarnessResult};

/// Exit code reported for a child that was terminated by a signal.
const NO_EXIT_CODE: i32 = -1;

/// Spawns the interpreter and relays its output to a [`Console`].
pub struct OutOfProcessExecutor {
    console: Console,
    timeout: Option<Duration>,
}

impl OutOfProcessExecutor {
    pub fn new(console: Console) -> Self {
        Self { console, timeout: None }
    }

    /// Kill the child and fail the run if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn run(&self, request: &ExecutionRequest, args: Vec<String>) -> HarnessResult<ExitCode> {
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

        let filter = LineFilter::for_program(&request.program);
        let stderr_task = child
            .stderr
            .take()
            .map(|stream| tokio::spawn(relay_stream(stream, filter.clone(), self.console.clone())));
        let stdout_task = child
            .stdout
            .take()
            .map(|stream| tokio::spawn(relay_stream(stream, filter, self.console.clone())));

        let status = match self.timeout {
            None => child.wait().await?,
            Some(limit) => match wait_with_timeout(&mut child, limit).await {
                Ok(status) => status?,
                Err(_) => {
                    tracing::warn!(program = %request.program.display(), ?limit, "killing interpreter after timeout");
                    child.kill().await?;
                    // Grandchildren may still hold the pipes open.
                    for task in [stderr_task, stdout_task].into_iter().flatten() {
                        task.abort();
                    }
                    return Err(HarnessError::TimedOut {
                        program: request.program.clone(),
                        timeout: limit,
                    });
                }
            },
        };

        join_drain(stderr_task).await?;
        join_drain(stdout_task).await?;

        let code = status.code().unwrap_or_else(|| {
            tracing::warn!(%status, "interpreter terminated without an exit code");
            NO_EXIT_CODE
        });
        Ok(ExitCode(code))
    }
}

impl Executor for OutOfProcessExecutor {
    #[tracing::instrument(skip_all, fields(program = %request.program.display()))]
    fn execute(&self, request: &ExecutionRequest) -> HarnessResult<ExitCode> {
        let args = split_arguments(&request.arguments)?;

        self.console
            .write_line(&format!("Executing \"{}\" {}", request.program.display(), request.arguments));
        self.console
            .write_line(&format!("Working Directory: \"{}\"", request.working_dir.display()));
        tracing::debug!(?args, working_dir = %request.working_dir.display(), "spawning interpreter");

        let code = block_on(self.run(request, args))??;
        tracing::debug!(exit_code = code.0, "interpreter exited");
        Ok(code)
    }
}

/// Shortens relayed lines that repeat the interpreter's own path.
///
/// Lua error messages start with `<argv[0]>: `; with absolute interpreter paths that prefix drowns the message.
#[derive(Debug, Clone)]
pub struct LineFilter {
    prefix: String,
}

impl LineFilter {
    pub fn for_program(program: &Path) -> Self {
        Self {
            prefix: format!("{}: ", program.display()),
        }
    }

    /// Strip the program prefix (ASCII case-insensitive) if the line starts with it.
    pub fn apply<'a>(&self, line: &'a str) -> &'a str {
        match line.get(..self.prefix.len()) {
            Some(head) if head.eq_ignore_ascii_case(&self.prefix) => &line[self.prefix.len()..],
            _ => line,
        }
    }
}

/// Feed every line of `stream` to `on_line`, without its terminator.
///
/// Invalid UTF-8 is replaced rather than treated as an error; interpreter output is for humans.
pub(crate) async fn read_lines<R>(stream: R, mut on_line: impl FnMut(&str)) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(trim_line_end(&buf));
        on_line(&line);
    }
}

async fn relay_stream<R>(stream: R, filter: LineFilter, console: Console) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    read_lines(stream, |line| console.write_line(filter.apply(line))).await
}

async fn wait_with_timeout(
    child: &mut tokio::process::Child,
    limit: Duration,
) -> Result<io::Result<std::process::ExitStatus>, tokio::time::error::Elapsed> {
    tokio::time::timeout(limit, child.wait()).await
}

async fn join_drain(task: Option<JoinHandle<io::Result<()>>>) -> io::Result<()> {
    match task {
        Some(task) => task.await.map_err(io::Error::other)?,
        None => Ok(()),
    }
}

fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
