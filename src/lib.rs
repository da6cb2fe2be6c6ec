//! Trawler: a file-server crawler
//!
//! This crate discovers files exposed by public FTP and HTTP servers by
//! recursively walking their directory and link structure, respecting
//! robots.txt and rate limits, and reports every discovered file to an
//! indexing sink for later search.

pub mod config;
pub mod crawler;
pub mod index;
pub mod robots;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown protocol scheme: {0}")]
    UnknownScheme(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("FTP error: {0}")]
    Ftp(#[from] suppaftp::FtpError),

    #[error("Body size limit exceeded for {url}")]
    BodySizeLimit { url: String },

    #[error("Maximum path depth exceeded at {url} (depth {depth})")]
    PathDepthExceeded { url: String, depth: usize },

    #[error("Crawl target terminated")]
    Terminated,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid entry URL in config: {0}")]
    InvalidEntry(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, RawEntry, DEFAULT_BOT_NAME};
pub use crawler::{Crawlers, FileInfo, ProtocolCrawler, WalkCallback};
pub use index::{FileEntry, FileIndex, MemoryIndex, ServerLocation};
