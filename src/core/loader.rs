use crate::core::normalize::{normalize_posts, NormalizeOptions};
use crate::domain::model::{NormalizedPost, Post, SiteInfo};
use crate::domain::ports::{HttpResponse, Transport};
use crate::utils::error::FetchFailure;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub timeout: Duration,
    pub normalize: NormalizeOptions,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            normalize: NormalizeOptions::default(),
        }
    }
}

/// fetch → 驗證狀態 → 解析 → 正規化。
///
/// 不做快取: 相同網址呼叫兩次就是兩次請求，由登錄表決定網址是否改變。
pub struct PostLoader<T: Transport> {
    transport: Arc<T>,
    options: LoaderOptions,
}

impl<T: Transport> PostLoader<T> {
    pub fn new(transport: Arc<T>, options: LoaderOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub async fn load_page(&self, uri: &str) -> Result<Vec<NormalizedPost>, FetchFailure> {
        let posts: Vec<Post> = self.fetch_json(uri).await?;
        tracing::debug!("Parsed {} posts from {}", posts.len(), uri);
        normalize_posts(&posts, &self.options.normalize)
    }

    pub async fn load_site_info(&self, uri: &str) -> Result<SiteInfo, FetchFailure> {
        self.fetch_json(uri).await
    }

    async fn fetch_json<D: DeserializeOwned>(&self, uri: &str) -> Result<D, FetchFailure> {
        let response = self.fetch(uri).await?;

        if !response.is_success() {
            return Err(FetchFailure::HttpStatus {
                status: response.status,
                status_text: response.status_text,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| FetchFailure::parse(e.to_string()))
    }

    async fn fetch(&self, uri: &str) -> Result<HttpResponse, FetchFailure> {
        let timeout = self.options.timeout;
        match tokio::time::timeout(timeout, self.transport.get(uri)).await {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::network(
                "TimeoutError",
                format!("No response from {} within {:?}", uri, timeout),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockTransport {
        responses: HashMap<String, HttpResponse>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        fn new(responses: Vec<(&str, HttpResponse)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(uri, res)| (uri.to_string(), res))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, uri: &str) -> Result<HttpResponse, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(uri)
                .cloned()
                .ok_or_else(|| FetchFailure::network("NetworkError", format!("no route to {}", uri)))
        }
    }

    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn get(&self, _uri: &str) -> Result<HttpResponse, FetchFailure> {
            std::future::pending().await
        }
    }

    fn post_json(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": {"rendered": format!("Post {}", id)},
            "excerpt": {"rendered": "Intro[&hellip;]"},
            "content": {"rendered": "<p>Body</p>"},
            "date": "2024-01-02T03:04:05",
            "link": format!("https://example.com/{}", id),
            "_embedded": {
                "author": [{"name": "Ada", "avatar_urls": {"48": "https://img/a.png"}}],
                "wp:featuredmedia": [{"source_url": "https://img/p.jpg", "alt_text": ""}],
                "wp:term": [[{"name": "News"}], [{"name": "rust"}, {"name": "rust"}]]
            }
        })
    }

    const URI: &str = "https://example.com/wp-json/wp/v2/posts?_embed&per_page=4";

    #[tokio::test]
    async fn test_load_page_parses_and_normalizes() {
        let body = serde_json::json!([post_json(1), post_json(2)]).to_string();
        let transport = Arc::new(MockTransport::new(vec![(URI, HttpResponse::ok(body))]));
        let loader = PostLoader::new(transport.clone(), LoaderOptions::default());

        let posts = loader.load_page(URI).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Post 1");
        assert_eq!(posts[0].excerpt_html, "Intro...");
        assert_eq!(posts[0].image_alt, "Post image not found");
        assert_eq!(posts[1].tags, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_every_call_fetches_again() {
        let transport = Arc::new(MockTransport::new(vec![(URI, HttpResponse::ok("[]"))]));
        let loader = PostLoader::new(transport.clone(), LoaderOptions::default());

        loader.load_page(URI).await.unwrap();
        loader.load_page(URI).await.unwrap();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_http_status_failure() {
        let response = HttpResponse {
            status: 404,
            status_text: "Not Found".to_string(),
            body: "{}".to_string(),
        };
        let transport = Arc::new(MockTransport::new(vec![(URI, response)]));
        let loader = PostLoader::new(transport, LoaderOptions::default());

        let err = loader.load_page(URI).await.unwrap_err();
        assert_eq!(
            err,
            FetchFailure::HttpStatus {
                status: 404,
                status_text: "Not Found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_failure() {
        let transport = Arc::new(MockTransport::new(vec![(URI, HttpResponse::ok("<html>"))]));
        let loader = PostLoader::new(transport, LoaderOptions::default());

        let err = loader.load_page(URI).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Parse { .. }));
    }

    #[tokio::test]
    async fn test_one_post_without_embedded_fails_whole_page() {
        let mut broken = post_json(2);
        broken.as_object_mut().unwrap().remove("_embedded");
        let body = serde_json::json!([post_json(1), broken]).to_string();
        let transport = Arc::new(MockTransport::new(vec![(URI, HttpResponse::ok(body))]));
        let loader = PostLoader::new(transport, LoaderOptions::default());

        let err = loader.load_page(URI).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Parse { .. }));
    }

    #[tokio::test]
    async fn test_hung_fetch_times_out() {
        let options = LoaderOptions {
            timeout: Duration::from_millis(20),
            ..LoaderOptions::default()
        };
        let loader = PostLoader::new(Arc::new(HangingTransport), options);

        let err = loader.load_page(URI).await.unwrap_err();
        assert!(matches!(err, FetchFailure::Network { ref name, .. } if name == "TimeoutError"));
    }

    #[tokio::test]
    async fn test_load_site_info() {
        let body = serde_json::json!({
            "url": "https://example.com",
            "name": "Example",
            "description": "Just another site",
            "timezone_string": "Europe/Madrid",
            "namespaces": ["wp/v2"]
        })
        .to_string();
        let site_uri = "https://example.com/wp-json";
        let transport = Arc::new(MockTransport::new(vec![(site_uri, HttpResponse::ok(body))]));
        let loader = PostLoader::new(transport, LoaderOptions::default());

        let info = loader.load_site_info(site_uri).await.unwrap();
        assert_eq!(info.name.as_deref(), Some("Example"));
        assert_eq!(info.timezone_string.as_deref(), Some("Europe/Madrid"));
    }
}
