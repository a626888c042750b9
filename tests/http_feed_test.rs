use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wp_feed::app::session::FeedOptions;
use wp_feed::core::loader::{LoaderOptions, PostLoader};
use wp_feed::core::Storage;
use wp_feed::{FeedApp, FetchFailure, LocalStorage, PageOutcome, ReqwestTransport};

fn transport() -> Arc<ReqwestTransport> {
    Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap())
}

fn post_json(id: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": {"rendered": format!("Post {}", id)},
        "excerpt": {"rendered": "<p>Short[&hellip;]</p>"},
        "content": {"rendered": "<p>Long</p>"},
        "date": "2023-12-31T23:59:59",
        "link": format!("https://blog.example.com/{}", id),
        "jetpack_featured_media_url": "https://cdn.example.com/fallback.jpg",
        "_embedded": {
            "author": [{"name": "Grace", "avatar_urls": {"24": "https://img/g24.png", "48": "https://img/g48.png"}}],
            "wp:term": [[{"name": "Tech"}], [{"name": "rust"}, {"name": "rust"}]]
        }
    })
}

#[tokio::test]
async fn test_submit_loads_site_and_first_page() {
    let server = MockServer::start();
    let site_mock = server.mock(|when, then| {
        when.method(GET).path("/wp-json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "url": "https://blog.example.com",
                "name": "Mocked Blog",
                "description": "A <em>mocked</em> site",
                "timezone_string": "UTC"
            }));
    });
    let posts_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wp/v2/posts")
            .query_param_exists("_embed")
            .query_param("per_page", "4");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([post_json(1), post_json(2)]));
    });

    let mut app = FeedApp::new(transport(), FeedOptions::default());
    let initial = app.submit(&server.base_url()).await.unwrap();

    site_mock.assert();
    posts_mock.assert();
    assert_eq!(initial.site, Ok(()));
    assert_eq!(initial.posts, PageOutcome::Rendered { page: 1, posts: 2 });

    let doc = app.document().lock().await;
    let posts = doc.posts().posts();
    assert_eq!(posts.len(), 2);

    let first = posts[0];
    // 沒有 wp:featuredmedia 時改用 jetpack 圖片
    assert_eq!(
        first.query_selector(".post-image").unwrap().attribute("src"),
        Some("https://cdn.example.com/fallback.jpg")
    );
    assert!(first
        .query_selector(".post-author")
        .unwrap()
        .inner_html()
        .contains("https://img/g48.png"));
    assert_eq!(
        first.query_selector(".post-date").unwrap().text_content(),
        "31/12/2023, 23:59:59"
    );
    assert_eq!(
        first.query_selector(".post-tags ul").unwrap().inner_html(),
        "<li>rust</li>"
    );
    assert!(doc.site().inner_html().contains("A <em>mocked</em> site"));
}

#[tokio::test]
async fn test_not_found_renders_error_and_stops() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json");
        then.status(404);
    });
    let posts_mock = server.mock(|when, then| {
        when.method(GET).path("/wp-json/wp/v2/posts");
        then.status(404)
            .header("Content-Type", "application/json")
            .body("{\"code\":\"rest_no_route\"}");
    });

    let mut app = FeedApp::new(transport(), FeedOptions::default());
    let initial = app.submit(&server.base_url()).await.unwrap();

    posts_mock.assert_hits(1);
    assert_eq!(
        initial.posts,
        PageOutcome::Failed {
            page: 1,
            failure: FetchFailure::HttpStatus {
                status: 404,
                status_text: "Not Found".to_string()
            }
        }
    );
    assert!(!app.is_paginating());
    assert!(app.scroll_to_end().await.is_none());
    posts_mock.assert_hits(1);

    let doc = app.document().lock().await;
    let errors = doc.posts().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].text_content(), "Error 404: Not Found");
    assert!(doc.posts().posts().is_empty());
    assert!(!doc.loader().is_visible());
}

#[tokio::test]
async fn test_invalid_json_is_a_parse_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json/wp/v2/posts");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html>maintenance</html>");
    });

    let loader = PostLoader::new(transport(), LoaderOptions::default());
    let result = loader
        .load_page(&server.url("/wp-json/wp/v2/posts?_embed&per_page=4"))
        .await;

    let failure = result.unwrap_err();
    assert!(matches!(failure, FetchFailure::Parse { .. }));
    assert!(failure.error_text().starts_with("Error ParseError: "));
}

#[tokio::test]
async fn test_page_two_request_carries_page_param() {
    let server = MockServer::start();
    let page_two = server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wp/v2/posts")
            .query_param("per_page", "4")
            .query_param("page", "2");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([post_json(5)]));
    });

    let loader = PostLoader::new(transport(), LoaderOptions::default());
    let posts = loader
        .load_page(&server.url("/wp-json/wp/v2/posts?_embed&per_page=4&page=2"))
        .await
        .unwrap();

    page_two.assert();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Post 5");
    assert_eq!(posts[0].excerpt_html, "<p>Short...</p>");
    assert_eq!(posts[0].categories, vec!["Tech"]);
    assert_eq!(posts[0].tags, vec!["rust"]);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json");
        then.status(200)
            .delay(Duration::from_secs(2))
            .json_body(serde_json::json!({"name": "Too slow"}));
    });

    let transport = Arc::new(ReqwestTransport::new(Duration::from_millis(200)).unwrap());
    let loader = PostLoader::new(transport, LoaderOptions::default());
    let failure = loader
        .load_site_info(&server.url("/wp-json"))
        .await
        .unwrap_err();

    match failure {
        FetchFailure::Network { name, .. } => assert_eq!(name, "TimeoutError"),
        other => panic!("expected network failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rendered_feed_written_to_disk() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json");
        then.status(200)
            .json_body(serde_json::json!({"name": "Disk Blog", "url": "https://disk.example.com"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/wp-json/wp/v2/posts");
        then.status(200)
            .json_body(serde_json::json!([post_json(1)]));
    });

    let mut app = FeedApp::new(transport(), FeedOptions::default());
    let report = app.load_pages(&server.base_url(), 1).await.unwrap();
    assert_eq!(report.pages_loaded(), 1);
    assert_eq!(report.posts_rendered(), 1);
    assert!(report.failures().is_empty());

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("site/feed.html");
    let (storage, file_name) = LocalStorage::for_output_file(output.to_str().unwrap());
    storage
        .write_file(&file_name, app.render_html().await.as_bytes())
        .await
        .unwrap();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Disk Blog"));
    assert!(html.contains("<section id=\"posts\">"));
    assert!(html.contains("Post 1"));
}

#[test]
fn test_blocking_submit_with_tokio_test() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json/wp/v2/posts");
        then.status(200).json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/wp-json");
        then.status(200).json_body(serde_json::json!({}));
    });

    let outcome = tokio_test::block_on(async {
        let mut app = FeedApp::new(transport(), FeedOptions::default());
        app.submit(&server.base_url()).await.unwrap()
    });

    // 第一頁就是空的: 不開始觀察
    assert_eq!(outcome.posts, PageOutcome::Exhausted { page: 1 });
    assert!(!outcome.should_observe(true));
}
