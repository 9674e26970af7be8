//! Backends module - Traversal and console output
//!
//! Provides:
//! - filter: Folder and file inclusion decisions
//! - walk: Source-root traversal emitting records
//! - progress: Console progress and summary

pub mod filter;
pub mod progress;
pub mod walk;
