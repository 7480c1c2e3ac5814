//! Lexical path helpers.
//!
//! Nothing here touches the filesystem: listing entries may name files that do not exist yet (or at all), and
//! that has to surface as an execution failure rather than a discovery failure.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `base` and normalize it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Drop `.` components and fold `..` into its parent.
///
/// ## Notes
/// - `..` directly under a root stays at the root.
/// - Leading `..` on a relative path is kept, since there is nothing to fold it into.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Directory of `path` relative to `root`, with `/` separators.
///
/// Falls back to the name of the containing directory when `path` is not under `root`.
pub fn relative_dir(path: &Path, root: &Path) -> String {
    let dir = match path.strip_prefix(root) {
        Ok(relative) => relative.parent().map(Path::to_path_buf).unwrap_or_default(),
        Err(_) => path
            .parent()
            .and_then(Path::file_name)
            .map(PathBuf::from)
            .unwrap_or_default(),
    };

    dir.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_parent_dirs() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d.lua")), PathBuf::from("/a/c/d.lua"));
    }

    #[test]
    fn test_normalize_parent_at_root() {
        assert_eq!(normalize(Path::new("/../a.lua")), PathBuf::from("/a.lua"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_on_relative() {
        assert_eq!(normalize(Path::new("../x/../y")), PathBuf::from("../y"));
    }

    #[test]
    fn test_absolutize_relative() {
        assert_eq!(
            absolutize(Path::new("../lang/a.lua"), Path::new("/repo/tests/test")),
            PathBuf::from("/repo/tests/lang/a.lua")
        );
    }

    #[test]
    fn test_absolutize_absolute_ignores_base() {
        assert_eq!(
            absolutize(Path::new("/elsewhere/a.lua"), Path::new("/repo")),
            PathBuf::from("/elsewhere/a.lua")
        );
    }

    #[test]
    fn test_relative_dir_under_root() {
        assert_eq!(
            relative_dir(Path::new("/repo/tests/lang/ffi/a.lua"), Path::new("/repo/tests")),
            "lang/ffi"
        );
    }

    #[test]
    fn test_relative_dir_directly_in_root() {
        assert_eq!(relative_dir(Path::new("/repo/tests/a.lua"), Path::new("/repo/tests")), "");
    }

    #[test]
    fn test_relative_dir_outside_root() {
        assert_eq!(relative_dir(Path::new("/other/bench/a.lua"), Path::new("/repo/tests")), "bench");
    }
}
