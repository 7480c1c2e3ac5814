//! Shared fixtures for integration tests.
//!
//! `/bin/sh` stands in for the interpreter: the harness runs `/bin/sh <tests>/test/test.lua <flags> ...`, so the
//! "runner script" is a shell script that speaks the listing and run protocols.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use scriptest::HarnessConfig;
use tempfile::TempDir;

/// Runner script that lists `a.lua`, a skipped `b.lua` and `c.lua`, and fails any file containing `FAIL`.
pub const RUNNER_SCRIPT: &str = r#"
for arg in "$@"; do last=$arg; done
if [ "$last" = "--list" ]; then
  printf '%s\n' 'a.lua' '-b.lua reason text' 'c.lua'
  exit 0
fi
if grep -q FAIL "$last"; then
  echo "/bin/sh: failing $(basename "$last")" >&2
  exit 1
fi
echo "ran $(basename "$last")"
"#;

/// A throwaway interpreter source tree.
pub struct FakeTree {
    pub dir: TempDir,
}

impl FakeTree {
    /// Tree whose runner script is `script`.
    pub fn with_runner(script: &str) -> Self {
        let tree = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(tree.runner_dir()).unwrap();
        fs::create_dir_all(tree.root().join("fixtures")).unwrap();
        fs::write(tree.runner_dir().join("test.lua"), script).unwrap();
        tree
    }

    /// Tree with the default runner script and its three test files.
    pub fn standard() -> Self {
        let tree = Self::with_runner(RUNNER_SCRIPT);
        tree.write("tests/test/a.lua", "assert(true)\n");
        tree.write("tests/test/b.lua", "assert(false) -- FAIL, but skipped\n");
        tree.write("tests/test/c.lua", "error('FAIL')\n");
        tree
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn runner_dir(&self) -> PathBuf {
        self.root().join("tests").join("test")
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new()
            .with_root(self.root())
            .with_interpreter("/bin/sh")
            .with_fixture_dir(self.root().join("fixtures"))
    }

    pub fn report(&self) -> String {
        fs::read_to_string(self.root().join("tests").join("discovery.txt")).unwrap()
    }
}
