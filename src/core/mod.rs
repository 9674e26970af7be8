//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Raw configuration and named-config persistence
//! - The rule set resolver
//! - Map model (records, stats, warnings)
//! - Record sinks for the supported output formats
//! - Path normalization utilities
//! - File reading with encoding fallback

pub mod config;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod rules;
pub mod util;
