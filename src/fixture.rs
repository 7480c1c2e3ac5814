//! Overflow fixture files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use scriptest_core::synthesize_overflow;

use crate::error::{HarnessError, HarnessResult};

const FIXTURE_PREFIX: &str = "scriptest-overflow-";
const FIXTURE_SUFFIX: &str = ".lua";

/// Write an overflow variant of `source_path` to a fresh temp file and return its path.
///
/// The file is kept after this returns; fixtures are left behind for post-mortem inspection.
///
/// ## Parameters
/// - `source_path`: the original script, read but never modified.
/// - `dir`: directory for the fixture, or the system temp dir when `None`.
pub fn write_overflow_fixture(source_path: &Path, dir: Option<&Path>) -> HarnessResult<PathBuf> {
    let fixture_err = |source: io::Error| HarnessError::Fixture {
        source_path: source_path.to_path_buf(),
        source,
    };

    let source = fs::read(source_path).map_err(fixture_err)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(FIXTURE_PREFIX).suffix(FIXTURE_SUFFIX);
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(fixture_err)?;

    file.write_all(&synthesize_overflow(&source)).map_err(fixture_err)?;
    file.flush().map_err(fixture_err)?;

    let (_, path) = file.keep().map_err(|err| fixture_err(err.error))?;
    tracing::debug!(fixture = %path.display(), original = %source_path.display(), "wrote overflow fixture");
    Ok(path)
}
