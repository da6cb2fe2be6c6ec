//! Configuration module for Trawler
//!
//! This module handles loading and parsing the JSON configuration document.
//! Each entrypoint blob keeps its raw, unparsed text: the orchestrator uses
//! it as a byte-for-byte identity key to detect unchanged targets across
//! configuration reloads.
//!
//! # Example
//!
//! ```no_run
//! use trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.json")).unwrap();
//! println!("Configured entrypoints: {}", config.entrypoints.len());
//! ```

mod parser;
mod types;

// Re-export types
pub use types::{
    EntryConfig, FtpCrawlerConfig, HttpCrawlerConfig, DEFAULT_BOT_NAME, DEFAULT_TURN_DELAY_SECS,
};
pub(crate) use types::rate_limit_interval;

// Re-export parser functions
pub use parser::{load_config, Config, RawEntry};
