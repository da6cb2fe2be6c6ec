//! Robots.txt rule group implementation
//!
//! This module wraps the robotstxt crate: a [`RuleGroup`] holds the raw
//! robots.txt content together with the robot name it was scoped to and
//! answers allow/deny questions on demand.

use robotstxt::DefaultMatcher;

/// The robots.txt rules applicable to one named crawling agent
///
/// Crawlers that could not obtain a robots.txt simply hold no `RuleGroup`,
/// which means every path is allowed.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    /// Raw robots.txt content (empty string means allow all)
    content: String,

    /// The robot name the rules are matched against
    robot_name: String,
}

impl RuleGroup {
    /// Creates a rule group from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `robot_name` - The agent name used to select the applicable group
    pub fn new(content: impl Into<String>, robot_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            robot_name: robot_name.into(),
        }
    }

    /// Checks whether the given URL may be visited
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL (or path) to check
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed (or the content is empty)
    /// * `false` - If the URL is disallowed for this robot name
    pub fn allows(&self, url: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, &self.robot_name, url)
    }
}
