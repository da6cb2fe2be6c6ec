//! Robots.txt handling module
//!
//! Each protocol crawler fetches `/robots.txt` over its own protocol at
//! construction time and keeps a [`RuleGroup`] scoped to its configured robot
//! name. A missing or unparsable robots.txt means "unrestricted", never an
//! error.

mod rules;

pub use rules::RuleGroup;
