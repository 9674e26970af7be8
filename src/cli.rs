//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backends::progress::{print_summary, print_warnings, ConsoleProgress};
use crate::backends::walk::generate_map;
use crate::core::config::{ConfigStore, RawConfig, DEFAULT_CONFIG_NAME};
use crate::core::model::MapReport;
use crate::core::paths::{absolutize, output_dir};
use crate::core::render::{JsonlWriter, OutputFormat, RecordSink, TextMapWriter};
use crate::core::rules::{RuleSet, ToolIdentity};
use crate::core::util::{header_timestamp, map_file_name, open_path};

/// codemap - snapshot a codebase into a single annotated text map.
#[derive(Parser, Debug)]
#[command(name = "codemap")]
#[command(
    author,
    version,
    about,
    long_about = r#"codemap walks one or more source folders and writes a single text file
containing every selected file, each introduced by its relative path.

Text files (by extension) are included with their content; other files appear
as a path marker only. Dependency caches, VCS metadata and build output are
skipped unless explicitly included.

Examples:
    codemap
    codemap --src ./project --src ./another
    codemap --folders app,database,config
    codemap --files config.php,routes.php
    codemap --except-folders tests,logs --except-files .env
    codemap --output ./maps/project.txt
    codemap --src ./app --folders models,controllers --save-config myapp
    codemap --config myapp
"#
)]
pub struct Cli {
    /// Source folder to scan (repeatable).
    #[arg(
        long,
        value_name = "DIR",
        long_help = "Source folder to scan. Repeat the flag to scan several folders; they are\n\
processed in the order given. Defaults to the current directory."
    )]
    pub src: Vec<String>,

    /// Only include these folders (comma-separated).
    #[arg(
        long,
        value_name = "FOLDERS",
        value_delimiter = ',',
        long_help = "Comma-separated list of folders to include, relative to each source folder.\n\n\
An entry with '/' matches that path and everything beneath it; a bare name also\n\
matches any folder with that name. Listing a normally skipped folder (such as\n\
node_modules) includes it."
    )]
    pub folders: Vec<String>,

    /// Only include these files (comma-separated).
    #[arg(
        long,
        value_name = "FILES",
        value_delimiter = ',',
        long_help = "Comma-separated list of file names or relative paths to include.\n\n\
Listed files are included even when they exceed the size limit."
    )]
    pub files: Vec<String>,

    /// Exclude these folders (comma-separated).
    #[arg(long, value_name = "FOLDERS", value_delimiter = ',')]
    pub except_folders: Vec<String>,

    /// Exclude these files (comma-separated).
    #[arg(long, value_name = "FILES", value_delimiter = ',')]
    pub except_files: Vec<String>,

    /// Text file extensions (comma-separated).
    #[arg(
        long,
        value_name = "EXTS",
        value_delimiter = ',',
        long_help = "Comma-separated list of extensions whose files are included with content\n\
(e.g. .rs,.toml,md). Replaces the built-in list."
    )]
    pub extensions: Vec<String>,

    /// Skip files larger than this many megabytes.
    #[arg(long, value_name = "MB")]
    pub max_file_size_mb: Option<f64>,

    /// Output file path ('-' for stdout).
    #[arg(
        short,
        long,
        value_name = "PATH",
        long_help = "Output file path. Use '-' to write the map to stdout.\n\n\
Defaults to codemap/output/code_map.txt under the working directory."
    )]
    pub output: Option<String>,

    /// Output format (text/jsonl).
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Stamp the default output file name with the date and time.
    #[arg(long)]
    pub timestamp: bool,

    /// Open the result when done (file/folder/none).
    #[arg(
        long,
        value_parser = ["file", "folder", "none"],
        default_value = "none",
        value_name = "TARGET"
    )]
    pub open: String,

    /// Load a named configuration.
    #[arg(
        long,
        value_name = "NAME",
        long_help = "Load a named configuration from codemap/config/NAME.json. Flags given on\n\
the command line override its values."
    )]
    pub config: Option<String>,

    /// Save the given flags as a named configuration and exit.
    #[arg(
        long = "save-config",
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CONFIG_NAME,
        long_help = "Save the rule flags of this command as a named configuration and exit.\n\n\
Without a name the configuration is saved as 'default', which is used whenever\n\
codemap runs without rule flags."
    )]
    pub save_config: Option<String>,

    /// Directory holding the codemap/ working folder.
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub workdir: PathBuf,

    /// Quiet mode (no per-file progress).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (log every decision).
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Rule flags as a raw configuration; unset flags stay `None`
    pub fn to_raw_config(&self) -> RawConfig {
        fn non_empty(items: &[String]) -> Option<Vec<String>> {
            let items: Vec<String> = items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (!items.is_empty()).then_some(items)
        }

        RawConfig {
            src: (!self.src.is_empty()).then(|| self.src.clone()),
            folders: non_empty(&self.folders),
            files: non_empty(&self.files),
            except_folders: non_empty(&self.except_folders),
            except_files: non_empty(&self.except_files),
            text_extensions: non_empty(&self.extensions),
            max_file_size_mb: self.max_file_size_mb,
            output: self.output.clone(),
            format: self.format.clone(),
        }
    }
}

/// Where the map is written
enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    fn describe(&self) -> String {
        match self {
            Destination::Stdout => "<stdout>".to_string(),
            Destination::File(path) => path.display().to_string(),
        }
    }
}

/// Pick the raw configuration: named config, saved default, or flags
fn select_config(cli: &Cli, store: &ConfigStore) -> Result<RawConfig> {
    let flags = cli.to_raw_config();

    if let Some(name) = &cli.config {
        let saved = store.load(name)?;
        if !cli.quiet {
            eprintln!("📖 Loading config: {}", name);
        }
        return Ok(saved.overlay(flags));
    }

    if !flags.has_rules() {
        if let Some(saved) = store.load_default()? {
            if !cli.quiet {
                eprintln!("📖 Using default config (codemap/config/default.json)");
                eprintln!("💡 To ignore the default config, pass any rule flag (e.g. --src .)");
            }
            return Ok(saved.overlay(flags));
        }
    }

    Ok(flags)
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let store = ConfigStore::new(&cli.workdir);

    if let Some(name) = &cli.save_config {
        let raw = cli.to_raw_config();
        let path = store.save(name, &raw)?;
        eprintln!("💾 Config saved: {}", path.display());
        if name == DEFAULT_CONFIG_NAME {
            eprintln!("💡 Run 'codemap' without rule flags to use it.");
        } else {
            eprintln!("To use: codemap --config {}", name);
        }
        return Ok(());
    }

    let raw = select_config(&cli, &store)?;
    let format: OutputFormat = raw
        .format
        .as_deref()
        .unwrap_or("text")
        .parse()
        .map_err(anyhow::Error::msg)?;

    let now = Local::now();
    let destination = match raw.output.as_deref() {
        Some("-") => Destination::Stdout,
        Some(path) => Destination::File(PathBuf::from(path)),
        None => Destination::File(output_dir(&cli.workdir).join(map_file_name(&now, cli.timestamp))),
    };

    let mut identity = ToolIdentity::current();
    if let Destination::File(path) = &destination {
        identity = identity.with_output(absolutize(path));
    }
    let rules = RuleSet::resolve(&raw, &identity)?;
    debug!(?rules, "resolved rules");

    let generated_at = header_timestamp(&now);
    let report = match &destination {
        Destination::Stdout => {
            let stdout = io::stdout();
            write_map(&rules, stdout.lock(), format, &generated_at, cli.quiet)?
        }
        Destination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_map(&rules, BufWriter::new(file), format, &generated_at, cli.quiet)?
        }
    };

    if cli.quiet {
        print_warnings(&report);
    } else {
        print_summary(&report, &destination.describe());
    }

    if let Destination::File(path) = &destination {
        open_result(&cli.open, path);
    }

    Ok(())
}

fn write_map<W: Write>(
    rules: &RuleSet,
    writer: W,
    format: OutputFormat,
    generated_at: &str,
    quiet: bool,
) -> Result<MapReport> {
    match format {
        OutputFormat::Text => {
            let sink = TextMapWriter::new(writer, generated_at).context("Failed to write header")?;
            stream_map(rules, sink, quiet)
        }
        OutputFormat::Jsonl => {
            let sink = JsonlWriter::new(writer, generated_at).context("Failed to write header")?;
            stream_map(rules, sink, quiet)
        }
    }
}

fn stream_map<S: RecordSink>(rules: &RuleSet, sink: S, quiet: bool) -> Result<MapReport> {
    let mut progress = ConsoleProgress::new(sink, quiet);
    generate_map(rules, &mut progress)
}

/// Post-completion action; failures are reported but never fail the run
fn open_result(target: &str, output: &Path) {
    let path = match target {
        "file" => output.to_path_buf(),
        "folder" => match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => absolutize(parent),
            _ => PathBuf::from("."),
        },
        _ => return,
    };
    eprintln!("Opening: {}", path.display());
    if let Err(e) = open_path(&path) {
        eprintln!("⚠ Could not open: {}", e);
    }
}
