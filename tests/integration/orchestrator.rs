//! Integration tests for the crawl orchestrator
//!
//! Drives [`Crawlers`] against a wiremock server through real configuration
//! files, covering the full discover-and-index path and the turn cycle.

use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use trawler::{Crawlers, MemoryIndex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

fn write_config(file: &NamedTempFile, entrypoints: &[String]) {
    let doc = format!(r#"{{"entrypoints": [{}]}}"#, entrypoints.join(", "));
    std::fs::write(file.path(), doc).unwrap();
}

#[tokio::test]
async fn test_discovered_files_end_up_in_the_index() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="file.bin">f</a>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/file.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("payload!")
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let config_file = NamedTempFile::new().unwrap();
    write_config(
        &config_file,
        &[format!(r#"{{"entry": "{}/", "turnDelay": 60.0}}"#, server.uri())],
    );

    let index = Arc::new(MemoryIndex::new());
    let mut crawlers = Crawlers::new(config_file.path(), index.clone());
    crawlers.reload().unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    crawlers.quit();
    crawlers.run().await;

    let record = index.get("file.bin", 8).expect("file.bin was not indexed");
    assert_eq!(record.mime_type, "application/octet-stream");
    assert_eq!(record.servers.len(), 1);
    assert_eq!(record.servers[0].url, format!("{}/", server.uri()));
    assert_eq!(record.servers[0].path, "/file.bin");
}

#[tokio::test]
async fn test_failing_walk_does_not_stop_subsequent_turns() {
    let server = MockServer::start().await;

    // Every walk fails on the overly deep link, but the turn cycle must keep
    // fetching the root on schedule.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="a/b/c.txt">deep</a>"#))
        .mount(&server)
        .await;

    let config_file = NamedTempFile::new().unwrap();
    write_config(
        &config_file,
        &[format!(
            r#"{{"entry": "{}/", "turnDelay": 0.2, "maxPathDepth": 1}}"#,
            server.uri()
        )],
    );

    let index = Arc::new(MemoryIndex::new());
    let mut crawlers = Crawlers::new(config_file.path(), index.clone());
    crawlers.reload().unwrap();

    tokio::time::sleep(Duration::from_millis(900)).await;
    crawlers.quit();
    crawlers.run().await;

    let root_fetches = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/")
        .count();
    assert!(
        root_fetches >= 2,
        "expected at least two turns, saw {} root fetches",
        root_fetches
    );
    assert_eq!(index.file_count(), 0);
}

#[tokio::test]
async fn test_reload_follows_the_configuration_file() {
    let a = r#"{"entry": "http://a.invalid/"}"#.to_string();
    let b = r#"{"entry": "http://b.invalid/"}"#.to_string();

    let config_file = NamedTempFile::new().unwrap();
    let index = Arc::new(MemoryIndex::new());
    let mut crawlers = Crawlers::new(config_file.path(), index);

    write_config(&config_file, &[a.clone()]);
    crawlers.reload().unwrap();
    assert_eq!(crawlers.target_count(), 1);

    write_config(&config_file, &[a.clone(), b.clone()]);
    crawlers.reload().unwrap();
    assert_eq!(crawlers.target_count(), 2);

    write_config(&config_file, &[b]);
    crawlers.reload().unwrap();
    assert_eq!(crawlers.target_count(), 1);

    // Malformed file: the reload fails and the running set is untouched
    std::fs::write(config_file.path(), "{not json").unwrap();
    assert!(crawlers.reload().is_err());
    assert_eq!(crawlers.target_count(), 1);

    crawlers.quit();
}
