//! Configuration resolver
//!
//! Turns a loosely-written [`RawConfig`] into the canonical [`RuleSet`] that the
//! traversal consults at every directory and file.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::core::config::{ConfigError, RawConfig};
use crate::core::paths::{normalize_entry, segments, starts_with_path, WORK_DIR_NAME};

/// Default maximum file size in megabytes
pub const DEFAULT_MAX_FILE_SIZE_MB: f64 = 10.0;

const MIB: f64 = 1024.0 * 1024.0;

/// Extensions whose files are emitted with their content
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    ".php", ".py", ".js", ".jsx", ".ts", ".tsx", ".html", ".css", ".scss", ".json", ".xml",
    ".yml", ".yaml", ".md", ".txt", ".sql", ".sh", ".bash", ".java", ".c", ".cpp", ".h", ".hpp",
    ".cs", ".go", ".rs", ".rb", ".vue", ".svelte", ".astro", ".env", ".gitignore", ".htaccess",
    ".conf", ".ini", ".sass", ".less", ".lock", ".toml", ".dockerfile", ".editorconfig",
];

/// Directory names that are pruned unless explicitly included
pub const BUILTIN_SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    "__pycache__",
    "vendor",
    ".idea",
    ".vscode",
    "dist",
    "build",
    ".next",
    ".cache",
    "coverage",
    ".pytest_cache",
    ".mypy_cache",
    "venv",
    "env",
    WORK_DIR_NAME,
];

/// Facts about the running tool that the rules must honor.
///
/// Passed in explicitly so resolution never consults process-wide state.
#[derive(Debug, Clone)]
pub struct ToolIdentity {
    /// Name of the tool's working directory; always pruned
    pub work_dir_name: String,
    /// File name of the tool's own executable; always skipped
    pub exe_name: Option<String>,
    /// Absolute path of the output file; never emitted
    pub output_path: Option<PathBuf>,
}

impl Default for ToolIdentity {
    fn default() -> Self {
        Self {
            work_dir_name: WORK_DIR_NAME.to_string(),
            exe_name: None,
            output_path: None,
        }
    }
}

impl ToolIdentity {
    /// Identity of the current process: working-directory name plus executable name
    pub fn current() -> Self {
        let exe_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));
        Self {
            exe_name,
            ..Self::default()
        }
    }

    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }
}

/// Canonical, read-only rule set for one run
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub source_roots: Vec<PathBuf>,
    pub include_folders: BTreeSet<String>,
    pub include_files: BTreeSet<String>,
    pub exclude_folders: BTreeSet<String>,
    pub exclude_files: BTreeSet<String>,
    pub text_extensions: BTreeSet<String>,
    pub max_file_size: u64,
    pub tool_dir_name: String,
    pub excluded_paths: BTreeSet<PathBuf>,
}

impl RuleSet {
    /// Resolve a raw configuration into a rule set
    pub fn resolve(raw: &RawConfig, identity: &ToolIdentity) -> Result<Self, ConfigError> {
        let source_roots = match &raw.src {
            Some(src) if !src.is_empty() => {
                let mut roots = Vec::with_capacity(src.len());
                for entry in src {
                    if entry.trim().is_empty() {
                        return Err(ConfigError::EmptySource);
                    }
                    roots.push(PathBuf::from(entry.trim()));
                }
                roots
            }
            _ => vec![PathBuf::from(".")],
        };

        let text_extensions = match &raw.text_extensions {
            Some(exts) => exts
                .iter()
                .map(|e| normalize_extension(e))
                .collect::<Result<BTreeSet<_>, _>>()?,
            None => DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        };

        let max_mb = raw.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);
        if !max_mb.is_finite() || max_mb <= 0.0 {
            return Err(ConfigError::InvalidMaxFileSize(max_mb));
        }
        let max_file_size = ((max_mb * MIB) as u64).max(1);

        let mut exclude_files = normalize_set(raw.except_files.as_deref());
        if let Some(exe) = &identity.exe_name {
            exclude_files.insert(exe.clone());
        }

        let excluded_paths = identity.output_path.iter().cloned().collect();

        Ok(Self {
            source_roots,
            include_folders: normalize_set(raw.folders.as_deref()),
            include_files: normalize_set(raw.files.as_deref()),
            exclude_folders: normalize_set(raw.except_folders.as_deref()),
            exclude_files,
            text_extensions,
            max_file_size,
            tool_dir_name: identity.work_dir_name.clone(),
            excluded_paths,
        })
    }

    /// Whether an `include_folders` entry covers this relative directory path.
    ///
    /// Covered means equal to or beneath an entry, or containing a segment equal to a
    /// bare-name entry (one without '/').
    pub fn include_covers(&self, rel: &str) -> bool {
        self.include_folders.iter().any(|entry| {
            starts_with_path(rel, entry)
                || (!entry.contains('/') && segments(rel).any(|seg| seg == entry))
        })
    }

    /// Whether this relative directory path lies on the way to a nested include entry
    pub fn is_include_ancestor(&self, rel: &str) -> bool {
        self.include_folders
            .iter()
            .any(|entry| entry.len() > rel.len() && starts_with_path(entry, rel))
    }

    pub fn is_excluded_folder(&self, rel: &str) -> bool {
        self.exclude_folders
            .iter()
            .any(|entry| starts_with_path(rel, entry))
    }

    /// Whether any segment of the path names the tool's working directory
    pub fn touches_tool_dir(&self, rel: &str) -> bool {
        segments(rel).any(|seg| seg == self.tool_dir_name)
    }

    pub fn has_builtin_skip_segment(&self, rel: &str) -> bool {
        segments(rel).any(|seg| seg == self.tool_dir_name || BUILTIN_SKIP_DIRS.contains(&seg))
    }

    /// Whether a file with this name should have its content included
    pub fn is_text_name(&self, file_name: &str) -> bool {
        match text_key(file_name) {
            Some(key) => self.text_extensions.contains(&key),
            None => false,
        }
    }
}

/// Lowercased `.ext` used for extension lookup.
///
/// A dotfile without a further extension (`.env`, `.gitignore`) is keyed by its full name.
fn text_key(file_name: &str) -> Option<String> {
    let name = file_name.to_lowercase();
    match name.rfind('.') {
        Some(0) if name.len() > 1 => Some(name),
        Some(idx) if idx + 1 < name.len() => Some(name[idx..].to_string()),
        _ => None,
    }
}

fn normalize_extension(ext: &str) -> Result<String, ConfigError> {
    let trimmed = ext.trim().to_lowercase();
    let with_dot = if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    };
    if with_dot.len() < 2 || with_dot.contains('/') || with_dot.contains('\\') {
        return Err(ConfigError::InvalidExtension(ext.to_string()));
    }
    Ok(with_dot)
}

fn normalize_set(entries: Option<&[String]>) -> BTreeSet<String> {
    entries
        .unwrap_or_default()
        .iter()
        .map(|e| normalize_entry(e))
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Option<Vec<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_defaults() {
        let rules = RuleSet::resolve(&RawConfig::default(), &ToolIdentity::default()).unwrap();
        assert_eq!(rules.source_roots, vec![PathBuf::from(".")]);
        assert!(rules.include_folders.is_empty());
        assert!(rules.include_files.is_empty());
        assert_eq!(rules.max_file_size, 10 * 1024 * 1024);
        assert!(rules.text_extensions.contains(".rs"));
        assert!(rules.text_extensions.contains(".editorconfig"));
        assert_eq!(rules.tool_dir_name, "codemap");
    }

    #[test]
    fn test_exe_and_output_always_excluded() {
        let identity = ToolIdentity {
            exe_name: Some("codemap".to_string()),
            ..ToolIdentity::default()
        }
        .with_output(PathBuf::from("/tmp/out/code_map.txt"));
        let raw = RawConfig {
            except_files: list(&["secret.env"]),
            ..RawConfig::default()
        };
        let rules = RuleSet::resolve(&raw, &identity).unwrap();
        assert!(rules.exclude_files.contains("codemap"));
        assert!(rules.exclude_files.contains("secret.env"));
        assert!(rules
            .excluded_paths
            .contains(&PathBuf::from("/tmp/out/code_map.txt")));
    }

    #[test]
    fn test_entries_are_normalized() {
        let raw = RawConfig {
            folders: list(&["./app/", "lib\\core"]),
            except_folders: list(&["tests/"]),
            ..RawConfig::default()
        };
        let rules = RuleSet::resolve(&raw, &ToolIdentity::default()).unwrap();
        assert!(rules.include_folders.contains("app"));
        assert!(rules.include_folders.contains("lib/core"));
        assert!(rules.exclude_folders.contains("tests"));
    }

    #[test]
    fn test_custom_extensions() {
        let raw = RawConfig {
            text_extensions: list(&["RS", ".Md"]),
            ..RawConfig::default()
        };
        let rules = RuleSet::resolve(&raw, &ToolIdentity::default()).unwrap();
        assert_eq!(
            rules.text_extensions.iter().cloned().collect::<Vec<_>>(),
            vec![".md".to_string(), ".rs".to_string()]
        );
        assert!(rules.is_text_name("main.RS"));
        assert!(!rules.is_text_name("index.js"));
    }

    #[test]
    fn test_invalid_extension_is_config_error() {
        let raw = RawConfig {
            text_extensions: list(&["."]),
            ..RawConfig::default()
        };
        assert!(matches!(
            RuleSet::resolve(&raw, &ToolIdentity::default()),
            Err(ConfigError::InvalidExtension(_))
        ));
    }

    #[test]
    fn test_invalid_max_size_is_config_error() {
        let raw = RawConfig {
            max_file_size_mb: Some(0.0),
            ..RawConfig::default()
        };
        assert!(matches!(
            RuleSet::resolve(&raw, &ToolIdentity::default()),
            Err(ConfigError::InvalidMaxFileSize(_))
        ));
    }

    #[test]
    fn test_empty_source_is_config_error() {
        let raw = RawConfig {
            src: list(&["src", "  "]),
            ..RawConfig::default()
        };
        assert!(matches!(
            RuleSet::resolve(&raw, &ToolIdentity::default()),
            Err(ConfigError::EmptySource)
        ));
    }

    #[test]
    fn test_fractional_max_size() {
        let raw = RawConfig {
            max_file_size_mb: Some(0.5),
            ..RawConfig::default()
        };
        let rules = RuleSet::resolve(&raw, &ToolIdentity::default()).unwrap();
        assert_eq!(rules.max_file_size, 512 * 1024);
    }

    #[test]
    fn test_text_key_dotfiles() {
        assert_eq!(text_key(".env"), Some(".env".to_string()));
        assert_eq!(text_key(".gitignore"), Some(".gitignore".to_string()));
        assert_eq!(text_key(".env.local"), Some(".local".to_string()));
        assert_eq!(text_key("Makefile"), None);
        assert_eq!(text_key("trailing."), None);
        assert_eq!(text_key("App.TSX"), Some(".tsx".to_string()));
    }

    #[test]
    fn test_include_covers() {
        let raw = RawConfig {
            folders: list(&["app", "lib/core"]),
            ..RawConfig::default()
        };
        let rules = RuleSet::resolve(&raw, &ToolIdentity::default()).unwrap();
        assert!(rules.include_covers("app"));
        assert!(rules.include_covers("app/models"));
        assert!(rules.include_covers("pkg/app"));
        assert!(rules.include_covers("lib/core/io"));
        assert!(!rules.include_covers("lib"));
        assert!(!rules.include_covers("application"));
        assert!(rules.is_include_ancestor("lib"));
        assert!(!rules.is_include_ancestor("app"));
        assert!(rules.is_include_ancestor(""));
    }
}
