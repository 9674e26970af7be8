//! Map traversal
//!
//! Walks each source root with walkdir, prunes directories as soon as they are seen,
//! decides every file and streams the resulting records into a [`RecordSink`].

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::backends::filter::{decide_file, decide_folder, FileDecision, FolderDecision};
use crate::core::file_reader::{read_text, Encoding, TextRead};
use crate::core::model::{MapReport, OutputRecord, RootWarning, Stats};
use crate::core::paths::make_relative;
use crate::core::render::RecordSink;
use crate::core::rules::RuleSet;

/// Files first, then directories; each group ordered by name
fn entry_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Traversal state for one run
pub struct Mapper<'a> {
    rules: &'a RuleSet,
    stats: Stats,
    warnings: Vec<RootWarning>,
}

impl<'a> Mapper<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            stats: Stats::default(),
            warnings: Vec::new(),
        }
    }

    /// Walk every source root in order, then report the summary to the sink
    pub fn run<S: RecordSink>(mut self, sink: &mut S) -> Result<MapReport> {
        let rules = self.rules;
        for root in &rules.source_roots {
            let Some(abs) = self.check_root(root) else {
                continue;
            };
            info!(root = %abs.display(), "scanning");
            sink.begin_root(&abs).context("Failed to write to output")?;
            self.walk_root(&abs, sink)?;
        }

        sink.finish(&self.stats).context("Failed to write summary")?;

        Ok(MapReport {
            stats: self.stats,
            warnings: self.warnings,
        })
    }

    /// Resolve a root to an absolute directory, recording a warning when it is unusable
    fn check_root(&mut self, root: &Path) -> Option<PathBuf> {
        let warning = if !root.exists() {
            RootWarning::NotFound {
                root: root.to_path_buf(),
            }
        } else if !root.is_dir() {
            RootWarning::NotADirectory {
                root: root.to_path_buf(),
            }
        } else {
            match root.canonicalize() {
                Ok(abs) => return Some(abs),
                Err(_) => RootWarning::NotFound {
                    root: root.to_path_buf(),
                },
            }
        };
        debug!(%warning, "skipping root");
        self.warnings.push(warning);
        None
    }

    fn walk_root<S: RecordSink>(&mut self, root: &Path, sink: &mut S) -> Result<()> {
        let rules = self.rules;
        let mut pruned = 0usize;

        let walker = WalkDir::new(root)
            .sort_by(entry_order)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let rel = make_relative(entry.path(), root).unwrap_or_default();
                if decide_folder(rules, &rel) == FolderDecision::Prune {
                    debug!(path = %rel, "pruned directory");
                    pruned += 1;
                    return false;
                }
                true
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("walk error: {}", err);
                    self.stats.errors += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
                continue;
            }

            let Some(rel) = make_relative(entry.path(), root) else {
                continue;
            };
            self.visit_file(entry.path(), rel, sink)?;
        }

        self.stats.pruned_dirs += pruned;
        Ok(())
    }

    fn visit_file<S: RecordSink>(&mut self, path: &Path, rel: String, sink: &mut S) -> Result<()> {
        let parent = rel.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        if decide_folder(self.rules, parent) == FolderDecision::PassThrough {
            debug!(path = %rel, "outside included folders");
            self.stats.skipped_files += 1;
            return Ok(());
        }

        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let record = match decide_file(self.rules, &rel, path, size) {
            FileDecision::Skip => {
                debug!(path = %rel, "skipped file");
                self.stats.skipped_files += 1;
                return Ok(());
            }
            FileDecision::Binary => {
                self.stats.binary_files += 1;
                OutputRecord::binary(rel, size)
            }
            FileDecision::Text => {
                let read = read_text(path);
                if let TextRead::Content {
                    encoding: Encoding::Latin1,
                    ..
                } = &read
                {
                    debug!(path = %rel, "not valid UTF-8, decoded as Latin-1");
                }
                if read.is_failed() {
                    warn!(path = %rel, "failed to read file");
                    self.stats.errors += 1;
                }
                self.stats.text_files += 1;
                OutputRecord::text(rel, read.into_text(), size)
            }
        };
        self.stats.total_size += size;

        sink.record(&record)
            .with_context(|| format!("Failed to write record for {}", record.path))
    }
}

/// Run one map generation over all roots of a rule set
pub fn generate_map<S: RecordSink>(rules: &RuleSet, sink: &mut S) -> Result<MapReport> {
    Mapper::new(rules).run(sink)
}
