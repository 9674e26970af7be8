//! Common utilities

use chrono::{DateTime, Local};
use std::path::Path;
use std::process::Command;

/// Timestamp written in the map header
pub fn header_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Output file name, optionally stamped with `MMDDYY-HHMM`
pub fn map_file_name(now: &DateTime<Local>, stamped: bool) -> String {
    if stamped {
        format!("code_map_{}.txt", now.format("%m%d%y-%H%M"))
    } else {
        "code_map.txt".to_string()
    }
}

/// Check if a command is available in PATH
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Open a file or folder with the platform's default handler
pub fn open_path(path: &Path) -> anyhow::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    };
    if !cfg!(windows) && !command_exists(opener) {
        anyhow::bail!("no opener available ({} not found)", opener);
    }
    Command::new(opener).arg(path).spawn()?;
    Ok(())
}
