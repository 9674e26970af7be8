//! Console progress
//!
//! Wraps a record sink and echoes each root and record to stderr.

use colored::Colorize;
use std::io;
use std::path::Path;

use crate::core::model::{MapReport, OutputRecord, Stats};
use crate::core::render::RecordSink;

const RULE_WIDTH: usize = 70;

/// Forwards to the inner sink, printing a line per record unless quiet
pub struct ConsoleProgress<S> {
    inner: S,
    quiet: bool,
}

impl<S: RecordSink> ConsoleProgress<S> {
    pub fn new(inner: S, quiet: bool) -> Self {
        Self { inner, quiet }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordSink> RecordSink for ConsoleProgress<S> {
    fn begin_root(&mut self, root: &Path) -> io::Result<()> {
        if !self.quiet {
            eprintln!("\n📁 Scanning: {}", root.display().to_string().bold());
            eprintln!("{}", "-".repeat(RULE_WIDTH));
        }
        self.inner.begin_root(root)
    }

    fn record(&mut self, record: &OutputRecord) -> io::Result<()> {
        if !self.quiet {
            if record.is_text() {
                eprintln!("  {} {}", "✓".green(), record.path);
            } else {
                eprintln!("  {} {}", "◆".cyan(), record.path);
            }
        }
        self.inner.record(record)
    }

    fn finish(&mut self, stats: &Stats) -> io::Result<()> {
        self.inner.finish(stats)
    }
}

/// Print the final summary block
pub fn print_summary(report: &MapReport, destination: &str) {
    let stats = &report.stats;
    eprintln!("\n{}", "=".repeat(RULE_WIDTH));
    eprintln!("{} Map generated: {}", "✓".green(), destination);
    eprintln!("  Text files: {}", stats.text_files);
    eprintln!("  Binary files: {}", stats.binary_files);
    eprintln!("  Skipped: {}", stats.skipped());
    if stats.errors > 0 {
        eprintln!("  {}", format!("Errors: {}", stats.errors).red());
    }
    eprintln!("  Size: {:.2} MB", stats.total_size_mb());
    print_warnings(report);
}

/// Print skipped roots; shown even in quiet mode
pub fn print_warnings(report: &MapReport) {
    for warning in &report.warnings {
        eprintln!("  {} {}: {}", "⚠".yellow(), warning.code(), warning);
    }
}
