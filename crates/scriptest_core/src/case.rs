//! Discovered test cases.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::listing::ListingLine;
use crate::paths;

/// Execution variant of a test case.
///
/// Each listing entry yields one case per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestOptions {
    #[default]
    None,
    /// Run the script behind a synthesized overflow prelude.
    WithOverflow,
}

impl TestOptions {
    /// Every variant, in the order cases are produced for one listing entry.
    pub const ALL: [TestOptions; 2] = [TestOptions::None, TestOptions::WithOverflow];

    pub fn name(self) -> &'static str {
        match self {
            TestOptions::None => "None",
            TestOptions::WithOverflow => "WithOverflow",
        }
    }

    pub fn is_none(self) -> bool {
        self == TestOptions::None
    }

    pub fn with_overflow(self) -> bool {
        self == TestOptions::WithOverflow
    }
}

impl fmt::Display for TestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One unit of work: a script path run under one set of options.
///
/// Cases are immutable once built; names and categories are derived at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    path: PathBuf,
    options: TestOptions,
    skipped: bool,
    skip_reason: String,
    category: String,
    display_name: String,
}

impl TestCase {
    /// Build a case for an already-absolute script path.
    ///
    /// ## Parameters
    /// - `path`: absolute script location.
    /// - `options`: execution variant.
    /// - `skip_reason`: `Some(reason)` marks the case skipped (the reason may be empty).
    /// - `tests_dir`: root used to derive the category of option-free cases.
    pub fn new(path: PathBuf, options: TestOptions, skip_reason: Option<String>, tests_dir: &Path) -> Self {
        let category = if options.is_none() {
            paths::relative_dir(&path, tests_dir)
        } else {
            options.name().to_string()
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display_name = if options.is_none() {
            stem
        } else {
            format!("{}.{}", options.name(), stem)
        };

        let skipped = skip_reason.is_some();
        Self {
            path,
            options,
            skipped,
            skip_reason: skip_reason.unwrap_or_default(),
            category,
            display_name,
        }
    }

    /// Expand one listing entry into its cases, one per [`TestOptions`] variant, option-free first.
    ///
    /// Relative listing paths are resolved against `base_dir`.
    pub fn expand(line: &ListingLine, base_dir: &Path, tests_dir: &Path) -> [TestCase; 2] {
        let path = paths::absolutize(Path::new(&line.path), base_dir);
        let reason = line.skipped.then(|| line.skip_reason.clone());
        TestOptions::ALL.map(|options| TestCase::new(path.clone(), options, reason.clone(), tests_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> TestOptions {
        self.options
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Empty when the case is runnable.
    pub fn skip_reason(&self) -> &str {
        &self.skip_reason
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}
