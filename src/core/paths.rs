//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative to a source root.

use std::path::{Path, PathBuf};

/// Name of the tool's working directory (holds `config/` and `output/`)
pub const WORK_DIR_NAME: &str = "codemap";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalize a user-supplied path entry: '/' separators, no empty or `.` segments, no trailing '/'
pub fn normalize_entry(entry: &str) -> String {
    let s = entry.trim().replace('\\', "/");
    let joined = segments(&s)
        .filter(|seg| *seg != ".")
        .collect::<Vec<_>>()
        .join("/");
    if s.starts_with('/') {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Split a normalized relative path into its segments
pub fn segments(rel: &str) -> impl Iterator<Item = &str> {
    rel.split('/').filter(|s| !s.is_empty())
}

/// Segment-aware prefix test: `rel` equals `prefix` or lies beneath it.
///
/// `src/app` starts with `src`, but `src2` does not.
pub fn starts_with_path(rel: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match rel.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// The last segment of a normalized relative path
pub fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// Get the tool's working directory under a base directory
pub fn work_dir(base: &Path) -> PathBuf {
    base.join(WORK_DIR_NAME)
}

/// Directory holding named configurations
pub fn config_dir(base: &Path) -> PathBuf {
    work_dir(base).join("config")
}

/// Directory receiving generated maps by default
pub fn output_dir(base: &Path) -> PathBuf {
    work_dir(base).join("output")
}

/// Best-effort absolute form of a path that may not exist yet.
///
/// Canonicalizes the parent when the path itself is missing, so the result can be
/// compared against canonical walk paths.
pub fn absolutize(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let parent = absolute.parent().map(Path::to_path_buf);
    let name = absolute.file_name().map(|n| n.to_os_string());
    match (parent, name) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("src/main.rs");
        assert_eq!(normalize_path(path), "src/main.rs");
    }

    #[test]
    fn test_normalize_entry() {
        assert_eq!(normalize_entry("./app/"), "app");
        assert_eq!(normalize_entry("app\\models"), "app/models");
        assert_eq!(normalize_entry(" config.php "), "config.php");
        assert_eq!(normalize_entry("."), "");
        assert_eq!(normalize_entry("././a//"), "a");
        assert_eq!(normalize_entry("app//models"), "app/models");
        assert_eq!(normalize_entry("app/./models/"), "app/models");
        assert_eq!(normalize_entry("/abs//dir/"), "/abs/dir");
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/src/main.rs");
        assert_eq!(make_relative(path, root), Some("src/main.rs".to_string()));
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        let path = Path::new("/other/file.rs");
        assert_eq!(make_relative(path, root), None);
    }

    #[test]
    fn test_make_relative_same_as_root() {
        let root = Path::new("/project");
        let path = Path::new("/project");
        assert_eq!(make_relative(path, root), Some("".to_string()));
    }

    #[test]
    fn test_starts_with_path() {
        assert!(starts_with_path("src", "src"));
        assert!(starts_with_path("src/app", "src"));
        assert!(starts_with_path("a/b/c", "a/b"));
        assert!(!starts_with_path("src2", "src"));
        assert!(!starts_with_path("sr", "src"));
        assert!(!starts_with_path("a", "a/b"));
    }

    #[test]
    fn test_segments_and_file_name() {
        let segs: Vec<_> = segments("a/b/c.rs").collect();
        assert_eq!(segs, vec!["a", "b", "c.rs"]);
        assert_eq!(file_name("a/b/c.rs"), "c.rs");
        assert_eq!(file_name("top.txt"), "top.txt");
        assert_eq!(segments("").count(), 0);
    }

    #[test]
    fn test_work_dirs() {
        let base = Path::new("/project");
        assert_eq!(work_dir(base), PathBuf::from("/project/codemap"));
        assert_eq!(config_dir(base), PathBuf::from("/project/codemap/config"));
        assert_eq!(output_dir(base), PathBuf::from("/project/codemap/output"));
    }

    #[test]
    fn test_absolutize_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("out.txt");
        let abs = absolutize(&missing);
        assert_eq!(abs, temp.path().canonicalize().unwrap().join("out.txt"));
    }
}
