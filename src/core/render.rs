//! Renderer module
//!
//! Record sinks that frame the traversal's record stream: the text map and JSON Lines.

use serde_json::json;
use std::io::{self, Write};
use std::path::Path;

use crate::core::model::{OutputRecord, RecordKind, Stats};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Consumer of the ordered record stream
pub trait RecordSink {
    /// Called before a source root is walked
    fn begin_root(&mut self, _root: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Called once per included file, in traversal order
    fn record(&mut self, record: &OutputRecord) -> io::Result<()>;

    /// Called once after the final root
    fn finish(&mut self, _stats: &Stats) -> io::Result<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn begin_root(&mut self, root: &Path) -> io::Result<()> {
        (**self).begin_root(root)
    }

    fn record(&mut self, record: &OutputRecord) -> io::Result<()> {
        (**self).record(record)
    }

    fn finish(&mut self, stats: &Stats) -> io::Result<()> {
        (**self).finish(stats)
    }
}

/// Text map framing:
///
/// ```text
/// MAP: Generated 2024-01-01 12:00:00
/// --src/main.rs
/// fn main() {}
/// ----
/// --logo.png
/// --SUMMARY
/// Text:1 Binary:1 Skipped:0
/// ```
pub struct TextMapWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextMapWriter<W> {
    /// Create a writer and emit the header line
    pub fn new(mut writer: W, generated_at: &str) -> io::Result<Self> {
        writeln!(writer, "MAP: Generated {}", generated_at)?;
        Ok(Self { writer })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for TextMapWriter<W> {
    fn record(&mut self, record: &OutputRecord) -> io::Result<()> {
        writeln!(self.writer, "--{}", record.path)?;
        if let RecordKind::Text(content) = &record.kind {
            self.writer.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                self.writer.write_all(b"\n")?;
            }
            self.writer.write_all(b"----\n")?;
        }
        Ok(())
    }

    fn finish(&mut self, stats: &Stats) -> io::Result<()> {
        writeln!(self.writer, "--SUMMARY")?;
        writeln!(
            self.writer,
            "Text:{} Binary:{} Skipped:{}",
            stats.text_files,
            stats.binary_files,
            stats.skipped()
        )?;
        self.writer.flush()
    }
}

/// JSON Lines framing: a header object, one object per record, a summary object
pub struct JsonlWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(mut writer: W, generated_at: &str) -> io::Result<Self> {
        let header = json!({ "type": "header", "generated": generated_at });
        writeln!(writer, "{}", header)?;
        Ok(Self { writer })
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonlWriter<W> {
    fn begin_root(&mut self, root: &Path) -> io::Result<()> {
        let line = json!({ "type": "root", "path": root.to_string_lossy() });
        writeln!(self.writer, "{}", line)
    }

    fn record(&mut self, record: &OutputRecord) -> io::Result<()> {
        let mut value = serde_json::to_value(record)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("type".to_string(), json!("record"));
        }
        writeln!(self.writer, "{}", value)
    }

    fn finish(&mut self, stats: &Stats) -> io::Result<()> {
        let summary = json!({
            "type": "summary",
            "text": stats.text_files,
            "binary": stats.binary_files,
            "skipped": stats.skipped(),
        });
        writeln!(self.writer, "{}", summary)?;
        self.writer.flush()
    }
}

/// Collects records in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub roots: Vec<String>,
    pub records: Vec<OutputRecord>,
    pub summary: Option<Stats>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.path.as_str()).collect()
    }
}

#[cfg(test)]
impl RecordSink for MemorySink {
    fn begin_root(&mut self, root: &Path) -> io::Result<()> {
        self.roots.push(root.to_string_lossy().into_owned());
        Ok(())
    }

    fn record(&mut self, record: &OutputRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, stats: &Stats) -> io::Result<()> {
        self.summary = Some(*stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> Stats {
        Stats {
            text_files: 1,
            binary_files: 1,
            skipped_files: 0,
            pruned_dirs: 1,
            ..Stats::default()
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("JSONL".parse::<OutputFormat>(), Ok(OutputFormat::Jsonl));
        assert!("md".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_map_framing() {
        let mut sink = TextMapWriter::new(Vec::new(), "2024-01-01 00:00:00").unwrap();
        sink.record(&OutputRecord::text("a.txt", "hello\n", 5)).unwrap();
        sink.record(&OutputRecord::binary("b.png", 4)).unwrap();
        sink.finish(&sample_stats()).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "MAP: Generated 2024-01-01 00:00:00\n\
             --a.txt\n\
             hello\n\
             ----\n\
             --b.png\n\
             --SUMMARY\n\
             Text:1 Binary:1 Skipped:1\n"
        );
    }

    #[test]
    fn test_jsonl_framing() {
        let mut sink = JsonlWriter::new(Vec::new(), "now").unwrap();
        sink.begin_root(Path::new("/project")).unwrap();
        sink.record(&OutputRecord::text("a.txt", "hello\n", 5)).unwrap();
        sink.finish(&sample_stats()).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["type"], "header");
        assert_eq!(lines[1]["type"], "root");
        assert_eq!(lines[2]["type"], "record");
        assert_eq!(lines[2]["content"], "hello\n");
        assert_eq!(lines[3]["skipped"], 1);
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.record(&OutputRecord::binary("x.bin", 1)).unwrap();
        sink.finish(&Stats::default()).unwrap();
        assert_eq!(sink.paths(), vec!["x.bin"]);
        assert_eq!(sink.summary, Some(Stats::default()));
    }
}
