//! Inclusion decisions
//!
//! Pure functions deciding, per directory and per file, what the walk does with it.
//! Paths are relative to the current source root and already '/'-normalized.

use std::path::Path;

use crate::core::paths::{file_name, segments};
use crate::core::rules::RuleSet;

/// What to do with a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderDecision {
    /// Never read the directory or anything beneath it
    Prune,
    /// Walk it; its files are candidates for the map
    Descend,
    /// Walk it only to reach a nested include entry; its own files are skipped
    PassThrough,
}

/// What to do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDecision {
    Skip,
    Binary,
    Text,
}

/// Decide a directory. First matching rule wins.
pub fn decide_folder(rules: &RuleSet, rel: &str) -> FolderDecision {
    if rel.is_empty() {
        return if rules.include_folders.is_empty() {
            FolderDecision::Descend
        } else {
            FolderDecision::PassThrough
        };
    }

    if rules.touches_tool_dir(rel) {
        return FolderDecision::Prune;
    }

    if rules.is_excluded_folder(rel) {
        return FolderDecision::Prune;
    }

    if rules.has_builtin_skip_segment(rel) {
        if rules.include_folders.is_empty() {
            return FolderDecision::Prune;
        }
        return include_decision(rules, rel);
    }

    if !rules.include_folders.is_empty() {
        return include_decision(rules, rel);
    }

    FolderDecision::Descend
}

fn include_decision(rules: &RuleSet, rel: &str) -> FolderDecision {
    if rules.include_covers(rel) {
        FolderDecision::Descend
    } else if rules.is_include_ancestor(rel) {
        FolderDecision::PassThrough
    } else {
        FolderDecision::Prune
    }
}

/// Decide a file. `size` is the stat'ed on-disk length (0 when stat failed).
pub fn decide_file(rules: &RuleSet, rel: &str, abs: &Path, size: u64) -> FileDecision {
    let name = file_name(rel);

    let parent = rel.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let in_tool_dir = segments(parent).any(|seg| seg == rules.tool_dir_name);
    if in_tool_dir || rules.excluded_paths.contains(abs) {
        return FileDecision::Skip;
    }

    if rules.exclude_files.contains(name) || rules.exclude_files.contains(rel) {
        return FileDecision::Skip;
    }

    if !rules.include_files.is_empty() {
        if rules.include_files.contains(name) || rules.include_files.contains(rel) {
            return classify(rules, name);
        }
        return FileDecision::Skip;
    }

    if size > rules.max_file_size {
        return FileDecision::Skip;
    }

    classify(rules, name)
}

fn classify(rules: &RuleSet, name: &str) -> FileDecision {
    if rules.is_text_name(name) {
        FileDecision::Text
    } else {
        FileDecision::Binary
    }
}
