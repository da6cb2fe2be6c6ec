//! HTTP crawler implementation
//!
//! Walks an HTTP(S) server by following anchor links downward from the entry
//! URL. A single GET request per URL serves both metadata discovery and link
//! discovery: separate HEAD requests are avoided because HEAD support is
//! unreliable across the kind of servers this crawler visits.

use crate::config::{rate_limit_interval, HttpCrawlerConfig};
use crate::crawler::{FileInfo, RateLimiter, WalkCallback};
use crate::robots::RuleGroup;
use crate::{ConfigError, CrawlError, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, Response};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Computes the depth of a URL path
///
/// The depth is the number of non-empty segments; the root path `/` has
/// depth 0. Dot segments are already resolved by URL normalization.
pub fn path_depth(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty() && *s != ".").count()
}

/// HTTP protocol crawler bound to one entry URL
pub struct HttpCrawler {
    config: HttpCrawlerConfig,
    entry: Url,
    client: Client,
    robots: Option<RuleGroup>,
    limiter: Option<RateLimiter>,
    /// URLs already visited during the current traversal
    visited: HashSet<Url>,
}

impl HttpCrawler {
    /// Creates an HTTP crawler from a raw entrypoint configuration blob
    ///
    /// If robots obedience is enabled, `/robots.txt` is fetched from the
    /// entry host; any failure there is non-fatal and simply means
    /// "unrestricted".
    pub async fn create(raw: &str) -> Result<Self> {
        let config: HttpCrawlerConfig = serde_json::from_str(raw).map_err(ConfigError::from)?;
        let entry = Url::parse(&config.entry)?;

        let client = build_http_client(&config.robot_name)?;
        let limiter = rate_limit_interval(config.rate_limit).map(RateLimiter::new);

        let robots = if config.obey_robots_txt {
            fetch_robots(&client, &entry, &config.robot_name).await
        } else {
            None
        };

        Ok(Self {
            config,
            entry,
            client,
            robots,
            limiter,
            visited: HashSet::new(),
        })
    }

    /// Performs one complete depth-first traversal from the entry URL
    pub async fn walk(&mut self, callback: &WalkCallback) -> Result<()> {
        self.visited.clear();
        self.walker(self.entry.clone(), callback).await
    }

    /// HTTP holds no persistent per-crawler resources
    pub fn close(&mut self) {}

    /// Recursive step: fetch `current`, report it as a file or descend into
    /// its links
    fn walker<'a>(
        &'a mut self,
        current: Url,
        callback: &'a WalkCallback,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if !self.visited.insert(current.clone()) {
                return Ok(());
            }

            let current_str = current.to_string();

            if let Some(robots) = &self.robots {
                if !robots.allows(&current_str) {
                    tracing::debug!("Skipping {} (disallowed by robots.txt)", current_str);
                    return Ok(());
                }
            }

            if let Some(limiter) = &mut self.limiter {
                limiter.acquire().await;
            }

            let response = self.client.get(current.clone()).send().await?;

            let content_length = response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);

            let mime_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(parse_media_type)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| mime_by_extension(current.path()));

            // Everything that is not an HTML page is a leaf file
            if mime_type != "text/html" {
                let modified = response
                    .headers()
                    .get(LAST_MODIFIED)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_http_date);

                callback(
                    &current_str,
                    FileInfo {
                        url: current,
                        size: content_length,
                        mime_type,
                        modified,
                    },
                );
                return Ok(());
            }

            let body = read_limited_body(response, self.config.body_size_limit).await?;
            if (body.len() as u64) < content_length {
                return Err(CrawlError::BodySizeLimit { url: current_str });
            }

            let links = extract_links(&String::from_utf8_lossy(&body));

            for href in links {
                let mut next = match current.join(&href) {
                    Ok(u) => u,
                    Err(e) => {
                        tracing::debug!("Skipping malformed href {:?}: {}", href, e);
                        continue;
                    }
                };
                next.set_fragment(None);

                // Stay on the entry host
                if next.host_str() != current.host_str() {
                    continue;
                }

                // Never walk upwards (e.g. ".." links in directory listings)
                let next_depth = path_depth(next.path());
                if next_depth < path_depth(current.path()) {
                    continue;
                }

                // Self-links such as "."
                if next == current {
                    continue;
                }

                if next_depth > self.config.max_path_depth {
                    return Err(CrawlError::PathDepthExceeded {
                        url: next.to_string(),
                        depth: next_depth,
                    });
                }

                self.walker(next, callback).await?;
            }

            Ok(())
        })
    }
}

/// Builds the HTTP client shared by all requests of one crawler
///
/// Certificate validation is disabled on purpose: public mirrors very often
/// serve expired or self-signed certificates, and no credentials beyond the
/// entry URL ever travel over these connections.
fn build_http_client(robot_name: &str) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(robot_name.to_string())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches and parses /robots.txt from the entry's host; `None` on any failure
async fn fetch_robots(client: &Client, entry: &Url, robot_name: &str) -> Option<RuleGroup> {
    let mut robots_url = entry.clone();
    robots_url.set_path("/robots.txt");
    robots_url.set_query(None);

    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(content) => Some(RuleGroup::new(content, robot_name)),
            Err(e) => {
                tracing::debug!("Failed to read robots.txt body from {}: {}", robots_url, e);
                None
            }
        },
        Ok(response) => {
            tracing::debug!(
                "No robots.txt at {} (HTTP {}), crawling unrestricted",
                robots_url,
                response.status()
            );
            None
        }
        Err(e) => {
            tracing::debug!("Failed to fetch robots.txt from {}: {}", robots_url, e);
            None
        }
    }
}

/// Reads at most `limit` body bytes from the response
async fn read_limited_body(mut response: Response, limit: u64) -> Result<Vec<u8>> {
    let limit = limit as usize;
    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() >= limit {
            let take = limit - body.len();
            body.extend_from_slice(&chunk[..take]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Extracts every anchor href from an HTML document
fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }
    }

    links
}

/// Strips parameters from a Content-Type header value
fn parse_media_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Guesses a MIME type from a path's file extension ("" if unknown)
pub(crate) fn mime_by_extension(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("")
        .to_string()
}

/// Parses an HTTP date header value (RFC 2822 style, e.g. Last-Modified)
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparsable Last-Modified value {:?}: {}", value, e);
            None
        }
    }
}
