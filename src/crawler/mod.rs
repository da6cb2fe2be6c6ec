//! Crawler module for walking remote file servers
//!
//! This module contains the core crawling logic, including:
//! - The shared data contract ([`FileInfo`], [`WalkCallback`])
//! - Request throttling ([`RateLimiter`])
//! - The protocol crawlers ([`FtpCrawler`], [`HttpCrawler`]) behind the
//!   closed [`ProtocolCrawler`] variant set
//! - The orchestrator ([`Crawlers`]) that owns crawl target lifecycles

mod ftp;
mod http;
mod orchestrator;

pub use ftp::FtpCrawler;
pub use http::{path_depth, HttpCrawler};
pub use orchestrator::Crawlers;

use crate::config::EntryConfig;
use crate::{ConfigError, CrawlError, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use url::Url;

/// A file discovered on a remote server
///
/// Immutable once constructed. Produced by a protocol crawler, consumed by
/// the walk callback.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// Absolute URL of the file
    pub url: Url,

    /// Size in bytes (0 if the server did not report one)
    pub size: u64,

    /// Best-effort MIME type (may be empty)
    pub mime_type: String,

    /// Last modification time, if known
    pub modified: Option<DateTime<Utc>>,
}

/// Callback invoked once per discovered file (never per directory)
///
/// The first argument is a path hint for logging; the second the file itself.
pub type WalkCallback = dyn Fn(&str, FileInfo) + Send + Sync;

/// Blocks requests so that two consecutive acquisitions are never closer
/// together than the configured period
#[derive(Debug)]
pub struct RateLimiter {
    interval: tokio::time::Interval,
}

impl RateLimiter {
    /// Creates a rate limiter with the given minimum period between ticks
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        // A burst after a long walk pause must not be replayed at full speed
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Waits until the next permitted tick
    pub async fn acquire(&mut self) {
        self.interval.tick().await;
    }
}

/// A protocol crawler bound to one entry URL
///
/// The variant set is closed: adding a protocol means adding a variant here,
/// the orchestrator stays untouched.
pub enum ProtocolCrawler {
    Ftp(FtpCrawler),
    Http(HttpCrawler),
}

impl ProtocolCrawler {
    /// Constructs the crawler matching the entry URL's scheme
    ///
    /// The raw configuration blob is handed to the protocol-specific
    /// constructor so each protocol parses its own fields and defaults.
    /// FTP construction blocks in its connect/login retry loops until a
    /// connection is established or `terminate` fires.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw JSON text of the entrypoint configuration blob
    /// * `terminate` - Entry-level termination signal
    pub async fn create(raw: &str, terminate: watch::Receiver<bool>) -> Result<Self> {
        let common: EntryConfig = serde_json::from_str(raw).map_err(ConfigError::from)?;
        let entry = Url::parse(&common.entry)?;

        match entry.scheme() {
            "http" | "https" => Ok(Self::Http(HttpCrawler::create(raw).await?)),
            "ftp" => Ok(Self::Ftp(FtpCrawler::create(raw, terminate).await?)),
            other => Err(CrawlError::UnknownScheme(other.to_string())),
        }
    }

    /// Performs one complete recursive traversal from the entry point
    ///
    /// Invokes `callback` once per discovered file. Returns once the
    /// traversal is exhausted or a hard limit was exceeded.
    pub async fn walk(&mut self, callback: &WalkCallback) -> Result<()> {
        match self {
            Self::Ftp(crawler) => crawler.walk(callback).await,
            Self::Http(crawler) => crawler.walk(callback).await,
        }
    }

    /// Releases protocol resources; called once when the entry is removed
    pub async fn close(&mut self) {
        match self {
            Self::Ftp(crawler) => crawler.close().await,
            Self::Http(crawler) => crawler.close(),
        }
    }
}
