//! File content reading
//!
//! Decodes UTF-8 first and falls back to Latin-1, which maps every byte to a char and
//! therefore never fails. Read failures become an inline error marker instead of aborting.

use std::fs;
use std::path::Path;

/// Encoding the content was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

/// Result of reading a text file for the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRead {
    /// Decoded content, guaranteed to end with '\n'
    Content {
        text: String,
        encoding: Encoding,
    },
    /// Literal error marker to embed in place of the content
    Failed { marker: String },
}

impl TextRead {
    /// The text to embed in the map, either content or error marker
    pub fn into_text(self) -> String {
        match self {
            TextRead::Content { text, .. } => text,
            TextRead::Failed { marker } => marker,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TextRead::Failed { .. })
    }
}

/// Decode bytes as UTF-8, falling back to Latin-1
pub fn decode(bytes: Vec<u8>) -> (String, Encoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, Encoding::Utf8),
        Err(err) => {
            let text = err.into_bytes().iter().map(|&b| b as char).collect();
            (text, Encoding::Latin1)
        }
    }
}

/// Append a newline unless the text already ends with one
pub fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Read a file for inclusion in the map
pub fn read_text(path: &Path) -> TextRead {
    match fs::read(path) {
        Ok(bytes) => {
            let (text, encoding) = decode(bytes);
            TextRead::Content {
                text: ensure_trailing_newline(text),
                encoding,
            }
        }
        Err(e) => TextRead::Failed {
            marker: format!("[Error: {}]\n", e),
        },
    }
}
