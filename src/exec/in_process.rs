//! Run the interpreter inside the harness process.
//!
//! The interpreter binary is loaded as a shared library and its C `main` is called directly. Output goes
//! straight to the inherited stdout/stderr; nothing is relayed.
//!
//! The working directory is process-wide state, so every in-process run holds [`CWD_LOCK`] from load to
//! unload and restores the previous directory through [`WorkingDirGuard`] on every exit path.
#![allow(unsafe_code)]

use std::env;
use std::ffi::{CString, c_char, c_int};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use libloading::{Library, Symbol};

use super::{ExecutionRequest, Executor, ExitCode, split_arguments};
use crate::error::{HarnessError, HarnessResult};

/// Signature of the interpreter's entry point.
type MainFn = unsafe extern "C" fn(argc: c_int, argv: *const *const c_char) -> c_int;

const ENTRY_POINT: &[u8] = b"main\0";

/// Serializes everything that changes the process working directory.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Acquire the working-directory lock, ignoring poisoning from a panicked holder.
pub fn lock_working_dir() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loads the interpreter as a library and calls its `main`.
#[derive(Debug, Default)]
pub struct InProcessExecutor;

impl InProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for InProcessExecutor {
    #[tracing::instrument(skip_all, fields(library = %request.program.display()))]
    fn execute(&self, request: &ExecutionRequest) -> HarnessResult<ExitCode> {
        let argv = ArgVector::new(&request.program, &split_arguments(&request.arguments)?)?;
        let _lock = lock_working_dir();

        // SAFETY: loading runs the library's initializers. The caller vouches for the interpreter build.
        let library = unsafe { Library::new(&request.program) }.map_err(|source| HarnessError::LibraryLoad {
            path: request.program.clone(),
            source,
        })?;

        let code = {
            // SAFETY: `MainFn` matches the C `int main(int, char **)` ABI the interpreter exports.
            let main: Symbol<MainFn> =
                unsafe { library.get(ENTRY_POINT) }.map_err(|source| HarnessError::EntryPoint {
                    path: request.program.clone(),
                    source,
                })?;

            let _cwd = WorkingDirGuard::enter(&request.working_dir)?;
            tracing::debug!(argc = argv.argc(), "calling interpreter main");
            // SAFETY: `argv` outlives the call and is a NULL-terminated array of NUL-terminated strings.
            unsafe { main(argv.argc(), argv.as_ptr()) }
        };

        if let Err(err) = library.close() {
            tracing::warn!(%err, "failed to unload interpreter library");
        }
        Ok(ExitCode(code))
    }
}

/// Owned C argument vector: `argv[0]` is the program, followed by the arguments and a trailing NULL.
pub struct ArgVector {
    // Keeps the strings behind `pointers` alive.
    _strings: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl ArgVector {
    pub fn new(program: &Path, args: &[String]) -> HarnessResult<Self> {
        let program = program.to_string_lossy().into_owned();
        let strings = std::iter::once(&program)
            .chain(args)
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| HarnessError::NulInArgument { argument: arg.clone() })
            })
            .collect::<HarnessResult<Vec<_>>>()?;

        let pointers = strings
            .iter()
            .map(|s| s.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();

        Ok(Self {
            _strings: strings,
            pointers,
        })
    }

    /// Number of arguments, not counting the trailing NULL.
    pub fn argc(&self) -> c_int {
        c_int::try_from(self.pointers.len() - 1).unwrap_or(c_int::MAX)
    }

    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }
}

/// Switches the process working directory and switches it back on drop.
///
/// Hold [`lock_working_dir`] for as long as the guard lives.
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> HarnessResult<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir).map_err(|source| HarnessError::WorkingDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            tracing::error!(%err, previous = %self.previous.display(), "failed to restore working directory");
        }
    }
}
