//! Integration tests for the HTTP crawler
//!
//! These tests use wiremock to simulate remote file servers and exercise the
//! full traversal cycle end-to-end.

use std::sync::{Arc, Mutex};
use trawler::crawler::HttpCrawler;
use trawler::{CrawlError, FileInfo};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Collects every callback invocation for later assertions
fn collector() -> (Arc<Mutex<Vec<FileInfo>>>, Box<trawler::WalkCallback>) {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let callback: Box<trawler::WalkCallback> = Box::new(move |_path, info| {
        sink.lock().unwrap().push(info);
    });
    (collected, callback)
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

fn plain_file(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/plain")
}

async fn crawler_for(server: &MockServer, extra: &str) -> HttpCrawler {
    let raw = format!(r#"{{"entry": "{}/"{}}}"#, server.uri(), extra);
    HttpCrawler::create(&raw).await.expect("failed to create crawler")
}

#[tokio::test]
async fn test_walk_reports_each_file_exactly_once_and_no_directories() {
    let server = MockServer::start().await;

    // No robots.txt; unmatched requests get a 404 which means "unrestricted"
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<html><body>
                <a href="a.txt">a</a>
                <a href="sub/">sub</a>
                <a href="a.txt">a again</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a.txt"))
        .respond_with(plain_file("hello"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sub/"))
        .respond_with(html_page(r#"<a href="b.bin">b</a>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sub/b.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0u8; 16])
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, "").await;
    let (collected, callback) = collector();

    crawler.walk(&*callback).await.expect("walk failed");

    let files = collected.lock().unwrap();
    let mut paths: Vec<String> = files.iter().map(|f| f.url.path().to_string()).collect();
    paths.sort();

    // Directories ("/" and "/sub/") never reach the callback, files do,
    // and the doubly-linked a.txt is reported only once.
    assert_eq!(paths, vec!["/a.txt".to_string(), "/sub/b.bin".to_string()]);

    let a = files.iter().find(|f| f.url.path() == "/a.txt").unwrap();
    assert_eq!(a.size, 5);
    assert_eq!(a.mime_type, "text/plain");
}

#[tokio::test]
async fn test_walk_never_leaves_the_entry_host() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="http://other.invalid/evil.txt">offsite</a>
               <a href="local.txt">local</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/local.txt"))
        .respond_with(plain_file("data"))
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, "").await;
    let (collected, callback) = collector();

    // A reachable offsite link must be skipped silently, not errored on
    crawler.walk(&*callback).await.expect("walk failed");

    let files = collected.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].url.path(), "/local.txt");
}

#[tokio::test]
async fn test_walk_skips_parent_and_self_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pub/sub/"))
        .respond_with(html_page(
            r#"<a href="../../top.txt">parent</a>
               <a href=".">self</a>
               <a href="deep.txt">deep</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pub/sub/deep.txt"))
        .respond_with(plain_file("x"))
        .mount(&server)
        .await;

    // The parent link must never be fetched
    Mock::given(method("GET"))
        .and(path("/top.txt"))
        .respond_with(plain_file("nope"))
        .expect(0)
        .mount(&server)
        .await;

    let raw = format!(r#"{{"entry": "{}/pub/sub/"}}"#, server.uri());
    let mut crawler = HttpCrawler::create(&raw).await.unwrap();
    let (collected, callback) = collector();

    crawler.walk(&*callback).await.expect("walk failed");

    let files = collected.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].url.path(), "/pub/sub/deep.txt");
}

#[tokio::test]
async fn test_walk_fails_when_max_path_depth_is_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="a/b/c.txt">too deep</a>"#))
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, r#", "maxPathDepth": 2"#).await;
    let (collected, callback) = collector();

    let result = crawler.walk(&*callback).await;
    assert!(matches!(
        result,
        Err(CrawlError::PathDepthExceeded { depth: 3, .. })
    ));
    assert!(collected.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_robots_disallow_suppresses_visiting_and_recursing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="private/">hidden dir</a>
               <a href="private/secret.txt">hidden file</a>
               <a href="pub.txt">public</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pub.txt"))
        .respond_with(plain_file("ok"))
        .mount(&server)
        .await;

    // Nothing below /private may be requested at all
    Mock::given(method("GET"))
        .and(path("/private/"))
        .respond_with(html_page(r#"<a href="secret.txt">s</a>"#))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private/secret.txt"))
        .respond_with(plain_file("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, "").await;
    let (collected, callback) = collector();

    crawler.walk(&*callback).await.expect("walk failed");

    let files = collected.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].url.path(), "/pub.txt");
}

#[tokio::test]
async fn test_missing_robots_txt_means_unrestricted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="anything.txt">f</a>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/anything.txt"))
        .respond_with(plain_file("y"))
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, "").await;
    let (collected, callback) = collector();

    crawler.walk(&*callback).await.expect("walk failed");
    assert_eq!(collected.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_walk_fails_when_body_size_limit_is_exceeded() {
    let server = MockServer::start().await;

    let big_page = format!("<html><body>{}</body></html>", "x".repeat(4096));
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&big_page))
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, r#", "maxBodySize": 64"#).await;
    let (collected, callback) = collector();

    let result = crawler.walk(&*callback).await;
    assert!(matches!(result, Err(CrawlError::BodySizeLimit { .. })));
    assert!(collected.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_last_modified_header_is_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="old.txt">old</a>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old.txt"))
        .respond_with(
            plain_file("old").insert_header("last-modified", "Tue, 15 Nov 1994 08:12:31 GMT"),
        )
        .mount(&server)
        .await;

    let mut crawler = crawler_for(&server, "").await;
    let (collected, callback) = collector();

    crawler.walk(&*callback).await.expect("walk failed");

    let files = collected.lock().unwrap();
    assert_eq!(files[0].modified.map(|dt| dt.timestamp()), Some(784887151));
}
