//! Stand-in interpreter library: exports a C `main` that records what it was called with.
//!
//! Writes `entry.txt` into its working directory (cwd, whether argv is NULL-terminated, then one line per
//! argument) and returns the value of an `exit=<n>` argument, or 0.

use std::ffi::{CStr, c_char, c_int};
use std::fs::File;
use std::io::Write;

#[no_mangle]
pub extern "C" fn main(argc: c_int, argv: *const *const c_char) -> c_int {
    let count = usize::try_from(argc).unwrap_or(0);
    let args: Vec<String> = (0..count)
        .map(|i| unsafe { CStr::from_ptr(*argv.add(i)) }.to_string_lossy().into_owned())
        .collect();
    let terminated = unsafe { (*argv.add(count)).is_null() };
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();

    if let Ok(mut out) = File::create("entry.txt") {
        let _ = writeln!(out, "cwd={}", cwd);
        let _ = writeln!(out, "terminated={}", terminated);
        for arg in &args {
            let _ = writeln!(out, "arg={}", arg);
        }
    }

    args.iter()
        .find_map(|arg| arg.strip_prefix("exit="))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}
