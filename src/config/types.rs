use serde::Deserialize;
use std::time::Duration;

/// Default robot name used for robots.txt rule group selection
pub const DEFAULT_BOT_NAME: &str = "TrawlerBot";

/// Default delay between two traversals of the same target, in seconds
pub const DEFAULT_TURN_DELAY_SECS: f64 = 10.0;

/// Default HTTP body size limit in bytes (10 MB)
const DEFAULT_BODY_SIZE_LIMIT: u64 = 10_000_000;

/// Default maximum HTTP path depth
const DEFAULT_MAX_PATH_DEPTH: usize = 20;

/// Common per-entrypoint fields, parsed by the orchestrator
///
/// The entry URL's scheme decides which protocol crawler is constructed;
/// everything else in the blob is parsed by that crawler itself.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    /// Entry URL of the crawl target
    pub entry: String,

    /// Seconds to sleep between two complete traversals
    #[serde(rename = "turnDelay", default = "default_turn_delay")]
    pub turn_delay: f64,
}

impl EntryConfig {
    /// Returns the turn delay as a `Duration`
    pub fn turn_delay(&self) -> Duration {
        Duration::from_secs_f64(self.turn_delay.max(0.0))
    }
}

/// FTP crawler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FtpCrawlerConfig {
    /// Entry URL (ftp://[user[:pass]@]host[:port]/path)
    pub entry: String,

    /// Minimum interval between requests in seconds (0 = unlimited)
    #[serde(rename = "maxRequestPerSecond", default)]
    pub rate_limit: f64,

    /// Robot name used to select a robots.txt rule group
    #[serde(rename = "robotName", default = "default_bot_name")]
    pub robot_name: String,

    /// Whether to fetch and obey /robots.txt
    #[serde(rename = "obeyRobotsTxt", default = "default_true")]
    pub obey_robots_txt: bool,
}

/// HTTP crawler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpCrawlerConfig {
    /// Entry URL (http:// or https://)
    pub entry: String,

    /// Maximum number of body bytes downloaded per HTML page
    #[serde(rename = "maxBodySize", default = "default_body_size_limit")]
    pub body_size_limit: u64,

    /// Maximum path depth a discovered link may have
    #[serde(rename = "maxPathDepth", default = "default_max_path_depth")]
    pub max_path_depth: usize,

    /// Minimum interval between requests in seconds (0 = unlimited)
    #[serde(rename = "maxRequestPerSecond", default)]
    pub rate_limit: f64,

    /// Robot name used to select a robots.txt rule group
    #[serde(rename = "robotName", default = "default_bot_name")]
    pub robot_name: String,

    /// Whether to fetch and obey /robots.txt
    #[serde(rename = "obeyRobotsTxt", default = "default_true")]
    pub obey_robots_txt: bool,
}

/// Converts a rate limit value in seconds into an optional interval
pub(crate) fn rate_limit_interval(rate_limit: f64) -> Option<Duration> {
    if rate_limit > 0.0 {
        Some(Duration::from_secs_f64(rate_limit))
    } else {
        None
    }
}

fn default_turn_delay() -> f64 {
    DEFAULT_TURN_DELAY_SECS
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_body_size_limit() -> u64 {
    DEFAULT_BODY_SIZE_LIMIT
}

fn default_max_path_depth() -> usize {
    DEFAULT_MAX_PATH_DEPTH
}
