//! Integration tests for the download pipeline
//!
//! These tests use wiremock to stand in for the search provider and the
//! image hosts, and run full downloads into temporary directories.

use image_trawl::config::Config;
use image_trawl::{get_image_urls_with, Coordinator, TrawlError};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, root: &Path, page_size: u32) -> Config {
    let mut config = Config::default();
    config.provider.base_url = server.uri();
    config.client.timeout_secs = 5;
    config.download.output_root = Some(root.to_path_buf());
    config.download.page_size = page_size;
    config
}

/// Mounts the search page that carries the session token
async fn mount_token_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><script>DDG.deep.initialize('/d.js?q=x', vqd='4-test');</script></html>"),
        )
        .mount(server)
        .await;
}

/// Mounts one results page at the given offset
async fn mount_results_page(server: &MockServer, offset: u64, records: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/i.js"))
        .and(query_param("vqd", "4-test"))
        .and(query_param("s", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": records })))
        .mount(server)
        .await;
}

/// Mounts an image that answers with the given bytes
async fn mount_image(server: &MockServer, image_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn record(server: &MockServer, title: &str, image_path: &str) -> Value {
    json!({
        "source": "Bing",
        "title": title,
        "height": 480,
        "width": 640,
        "url": format!("{}/page/{}", server.uri(), title),
        "image": format!("{}{}", server.uri(), image_path),
        "thumbnail": format!("{}/thumb{}", server.uri(), image_path),
    })
}

#[tokio::test]
async fn test_download_five_cats() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    let mut records = Vec::new();
    for i in 1..=5 {
        let image_path = format!("/img/cat{}.jpg", i);
        mount_image(&server, &image_path, format!("jpeg data {}", i).as_bytes()).await;
        records.push(record(&server, &format!("cat{}", i), &image_path));
    }
    mount_results_page(&server, 0, records).await;

    let config = create_test_config(&server, root.path(), 100);
    let coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.run("cats", 5).await.expect("Download failed");

    assert_eq!(summary.manifest.len(), 5);
    assert_eq!(summary.target_dir, root.path().join("cats"));
    for (i, path) in summary.manifest.iter().enumerate() {
        assert_eq!(path.parent().unwrap(), root.path().join("cats"));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("cat{}.jpg", i + 1)
        );
        let content = std::fs::read(path).unwrap();
        assert!(!content.is_empty());
    }
    assert_eq!(summary.stats.pages_fetched, 1);
    assert_eq!(summary.stats.downloaded, 5);
}

#[tokio::test]
async fn test_stops_exactly_at_requested_count() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    let mut records = Vec::new();
    for i in 1..=8 {
        let image_path = format!("/img/{}.png", i);
        let expected_calls: u64 = if i <= 3 { 1 } else { 0 };
        Mock::given(method("GET"))
            .and(path(image_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .expect(expected_calls)
            .mount(&server)
            .await;
        records.push(record(&server, &format!("image {}", i), &image_path));
    }
    mount_results_page(&server, 0, records).await;

    let config = create_test_config(&server, root.path(), 100);
    let paths = image_trawl::download_images_with(config, "stop early", 3)
        .await
        .expect("Download failed");

    assert_eq!(paths.len(), 3);
    let entries = std::fs::read_dir(root.path().join("stop+early")).unwrap().count();
    assert_eq!(entries, 3);
}

#[tokio::test]
async fn test_existing_directory_is_fatal() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("cats")).unwrap();

    // No request may be made when the directory cannot be created
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, root.path(), 100);
    let result = image_trawl::download_images_with(config, "cats", 3).await;

    assert!(matches!(result, Err(TrawlError::TargetDir { .. })));
    let entries = std::fs::read_dir(root.path().join("cats")).unwrap().count();
    assert_eq!(entries, 0);
}

#[tokio::test]
async fn test_failed_images_advance_to_next_page() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_results_page(
        &server,
        0,
        vec![
            record(&server, "gone1", "/img/missing.jpg"),
            record(&server, "gone2", "/img/missing.jpg"),
        ],
    )
    .await;

    mount_image(&server, "/img/ok1.gif", b"GIF89a-1").await;
    mount_image(&server, "/img/ok2.gif", b"GIF89a-2").await;
    mount_results_page(
        &server,
        2,
        vec![
            record(&server, "ok1", "/img/ok1.gif"),
            record(&server, "ok2", "/img/ok2.gif"),
        ],
    )
    .await;

    let config = create_test_config(&server, root.path(), 2);
    let coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.run("gifs", 2).await.expect("Download failed");

    assert_eq!(summary.manifest.len(), 2);
    assert!(summary.manifest.iter().all(|p| p.extension().unwrap() == "gif"));
    assert_eq!(summary.stats.pages_fetched, 2);
    assert_eq!(summary.stats.fetch_failures, 2);
}

#[tokio::test]
async fn test_missing_token_fails_the_run() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no token here</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/i.js"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, root.path(), 100);
    let result = image_trawl::download_images_with(config, "cats", 2).await;

    assert!(matches!(result, Err(TrawlError::TokenParse { .. })));
}

#[tokio::test]
async fn test_extension_selection() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    mount_image(&server, "/img/logo.png", b"png").await;
    mount_image(&server, "/img/render", b"no extension").await;
    mount_results_page(
        &server,
        0,
        vec![
            record(&server, "logo", "/img/logo.png"),
            record(&server, "render", "/img/render"),
        ],
    )
    .await;

    let config = create_test_config(&server, root.path(), 100);
    let paths = image_trawl::download_images_with(config, "mixed", 2)
        .await
        .expect("Download failed");

    assert!(paths[0].to_str().unwrap().ends_with("logo.png"));
    assert!(paths[1].to_str().unwrap().ends_with("render.jpg"));
}

#[tokio::test]
async fn test_duplicate_titles_overwrite() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    mount_image(&server, "/img/a.jpg", b"first").await;
    mount_image(&server, "/img/b.jpg", b"second").await;
    mount_results_page(
        &server,
        0,
        vec![
            record(&server, "same", "/img/a.jpg"),
            record(&server, "same", "/img/b.jpg"),
        ],
    )
    .await;

    let config = create_test_config(&server, root.path(), 100);
    let paths = image_trawl::download_images_with(config, "dupes", 2)
        .await
        .expect("Download failed");

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], paths[1]);
    assert_eq!(std::fs::read(&paths[0]).unwrap(), b"second");
}

#[tokio::test]
async fn test_write_failure_skips_record() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    let long_title = "x".repeat(300);
    mount_image(&server, "/img/long.jpg", b"long").await;
    mount_image(&server, "/img/short.jpg", b"short").await;
    mount_results_page(
        &server,
        0,
        vec![
            record(&server, &long_title, "/img/long.jpg"),
            record(&server, "short", "/img/short.jpg"),
        ],
    )
    .await;

    let config = create_test_config(&server, root.path(), 100);
    let coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.run("names", 1).await.expect("Download failed");

    assert_eq!(summary.manifest.len(), 1);
    assert!(summary.manifest[0].ends_with("short.jpg"));
    assert_eq!(summary.stats.write_failures, 1);
}

#[tokio::test]
async fn test_stalled_provider_aborts() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    Mock::given(method("GET"))
        .and(path("/i.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results": []}"#))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, root.path(), 100);
    config.download.max_stalled_pages = 3;
    let result = image_trawl::download_images_with(config, "nothing", 1).await;

    match result {
        Err(TrawlError::Stalled {
            pages,
            collected,
            requested,
        }) => {
            assert_eq!(pages, 3);
            assert_eq!(collected, 0);
            assert_eq!(requested, 1);
        }
        other => panic!("Expected Stalled error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_page_failure_after_progress_is_fatal() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    mount_image(&server, "/img/first.jpg", b"first").await;
    mount_results_page(&server, 0, vec![record(&server, "first", "/img/first.jpg")]).await;
    Mock::given(method("GET"))
        .and(path("/i.js"))
        .and(query_param("vqd", "4-test"))
        .and(query_param("s", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, root.path(), 1);
    let result = image_trawl::download_images_with(config, "partial", 2).await;

    assert!(matches!(result, Err(TrawlError::Fetch { status: 500, .. })));
    // The file written before the failure stays on disk
    let saved = std::fs::read(root.path().join("partial").join("first.jpg")).unwrap();
    assert_eq!(saved, b"first");
}

#[tokio::test]
async fn test_get_image_urls_lists_metadata() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;
    mount_results_page(
        &server,
        15,
        vec![
            record(&server, "one", "/img/1.webp"),
            record(&server, "two", "/img/2.bmp"),
        ],
    )
    .await;

    let config = create_test_config(&server, root.path(), 100);
    let records = get_image_urls_with(&config, "listing", 15).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "one");
    assert_eq!(records[0].width, 640);
    assert_eq!(records[1].image_url, format!("{}/img/2.bmp", server.uri()));
    assert!(!root.path().join("listing").exists());
}

#[tokio::test]
async fn test_get_image_urls_malformed_page_is_empty() {
    let server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    mount_token_page(&server).await;

    Mock::given(method("GET"))
        .and(path("/i.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let config = create_test_config(&server, root.path(), 100);
    let records = get_image_urls_with(&config, "broken", 0).await.unwrap();

    assert!(records.is_empty());
}
