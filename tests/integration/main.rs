//! Integration test entry point
//!
//! Cargo only builds `tests/` subdirectories that carry a `main.rs`, so the
//! suite modules are declared here.

mod http_crawler;
mod orchestrator;
