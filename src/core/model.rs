//! Map model
//!
//! Records emitted by the traversal, the run statistics, and per-root warnings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// What an output record carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum RecordKind {
    /// Full decoded content, always ending in '\n'
    Text(String),
    /// Path only; content intentionally omitted
    Binary,
}

/// One included file, in traversal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Path relative to the source root, using '/' as separator
    pub path: String,

    #[serde(flatten)]
    pub kind: RecordKind,

    /// On-disk size at stat time (0 when stat failed)
    pub size: u64,
}

impl OutputRecord {
    pub fn text(path: impl Into<String>, content: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: RecordKind::Text(content.into()),
            size,
        }
    }

    pub fn binary(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: RecordKind::Binary,
            size,
        }
    }

    #[cfg(test)]
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::Text(content) => Some(content),
            RecordKind::Binary => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, RecordKind::Text(_))
    }
}

/// Statistics accumulated across all roots of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub text_files: usize,
    pub binary_files: usize,
    /// Files encountered but not emitted
    pub skipped_files: usize,
    /// Directories pruned without being read
    pub pruned_dirs: usize,
    /// File read and directory listing failures
    pub errors: usize,
    /// Sum of on-disk sizes of emitted files
    pub total_size: u64,
}

impl Stats {
    /// Entries left out of the map: skipped files plus pruned directories
    pub fn skipped(&self) -> usize {
        self.skipped_files + self.pruned_dirs
    }

    /// Total size in megabytes
    pub fn total_size_mb(&self) -> f64 {
        self.total_size as f64 / (1024.0 * 1024.0)
    }
}

/// A source root that could not be traversed; the run continues without it
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum RootWarning {
    #[error("source folder not found: {}", root.display())]
    NotFound { root: PathBuf },

    #[error("not a directory: {}", root.display())]
    NotADirectory { root: PathBuf },
}

impl RootWarning {
    pub fn code(&self) -> &'static str {
        match self {
            RootWarning::NotFound { .. } => "ROOT_NOT_FOUND",
            RootWarning::NotADirectory { .. } => "ROOT_NOT_A_DIRECTORY",
        }
    }
}

/// Everything a caller learns once the run completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapReport {
    pub stats: Stats,
    pub warnings: Vec<RootWarning>,
}
