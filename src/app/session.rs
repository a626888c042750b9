use crate::core::document::{
    FeedContainer, SharedDocument, LOADING_POSTS_MESSAGE, LOADING_SITE_MESSAGE,
};
use crate::core::loader::{LoaderOptions, PostLoader};
use crate::core::normalize::NormalizeOptions;
use crate::core::pagination::{PageOutcome, PaginationController, PaginationState};
use crate::core::registry::{posts_route, ResourceRegistry, POSTS_RESOURCE};
use crate::core::render::{render_error, render_site_info, PostTemplate};
use crate::core::sentinel::Sentinel;
use crate::domain::model::NormalizedPost;
use crate::domain::ports::{ConfigProvider, Transport};
use crate::utils::error::FetchFailure;
use std::sync::Arc;

pub const DEFAULT_PER_PAGE: usize = 4;
pub const DEFAULT_ERROR_TAG: &str = "h2";

/// 執行時設定（由 CLI 或 TOML 設定轉換而來）
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub per_page: usize,
    pub halt_on_failure: bool,
    pub error_tag: String,
    pub loader: LoaderOptions,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            halt_on_failure: true,
            error_tag: DEFAULT_ERROR_TAG.to_string(),
            loader: LoaderOptions::default(),
        }
    }
}

impl FeedOptions {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            per_page: config.per_page(),
            halt_on_failure: config.halt_on_failure(),
            error_tag: config.error_tag().to_string(),
            loader: LoaderOptions {
                timeout: config.request_timeout(),
                normalize: NormalizeOptions {
                    date_format: config.date_format().to_string(),
                },
            },
        }
    }
}

/// 第一次載入（網站資訊 + 第一頁）的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialLoad {
    pub site: Result<(), FetchFailure>,
    pub posts: PageOutcome,
}

impl InitialLoad {
    /// 第一頁之後是否要開始觀察哨兵
    pub fn should_observe(&self, halt_on_failure: bool) -> bool {
        match &self.posts {
            PageOutcome::Rendered { .. } => true,
            PageOutcome::Exhausted { .. } => false,
            PageOutcome::Failed { .. } => !halt_on_failure,
        }
    }
}

/// 一次表單送出對應一個 session: 擁有登錄表與分頁控制器，
/// 並透過共享參照寫入文件。
pub struct FeedSession<T: Transport> {
    registry: ResourceRegistry,
    loader: PostLoader<T>,
    template: PostTemplate,
    controller: PaginationController,
    document: SharedDocument,
    options: FeedOptions,
}

impl<T: Transport> FeedSession<T> {
    pub fn new(domain: &str, transport: Arc<T>, document: SharedDocument, options: FeedOptions) -> Self {
        let mut registry = ResourceRegistry::new(domain);
        registry.set_resource(POSTS_RESOURCE, &posts_route(options.per_page, 1));

        Self {
            registry,
            loader: PostLoader::new(transport, options.loader.clone()),
            template: PostTemplate::default(),
            controller: PaginationController::new(1, options.per_page, options.halt_on_failure),
            document,
            options,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn pagination(&self) -> PaginationState {
        self.controller.state()
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// 同時抓取網站資訊與第一頁，分別渲染到各自的區塊
    pub async fn load_initial(&mut self) -> InitialLoad {
        let site_uri = self.registry.api_root().to_string();
        let posts_uri = self
            .registry
            .set_resource(POSTS_RESOURCE, &posts_route(self.options.per_page, 1))
            .to_string();

        self.document.lock().await.loader_mut().show(LOADING_SITE_MESSAGE);

        let (site, posts) = tokio::join!(
            self.loader.load_site_info(&site_uri),
            self.loader.load_page(&posts_uri)
        );

        let mut doc = self.document.lock().await;
        let site = match site {
            Ok(info) => {
                tracing::info!("🌐 Loaded site info from {}", site_uri);
                doc.site_mut().append_children(render_site_info(&info));
                Ok(())
            }
            Err(failure) => {
                tracing::warn!("❌ Site info failed: {}", failure);
                doc.site_mut()
                    .append_child(render_error(&failure, &self.options.error_tag));
                Err(failure)
            }
        };
        let posts = self.apply_page(doc.posts_mut(), 1, posts);
        doc.loader_mut().hide();

        InitialLoad { site, posts }
    }

    pub fn start_observing(&mut self, sentinel: &Sentinel) {
        self.controller.start(sentinel);
    }

    /// 等待哨兵觸發並載入下一頁；控制器斷線時回傳 `None`
    pub async fn advance(&mut self) -> Option<PageOutcome> {
        let uri = self.controller.next_page_uri(&mut self.registry).await?;
        Some(self.run_page(&uri).await)
    }

    /// 只處理已經排隊的可見度事件，沒有觸發時立即回傳 `None`
    pub async fn advance_pending(&mut self) -> Option<PageOutcome> {
        let uri = self.controller.poll_page_uri(&mut self.registry)?;
        Some(self.run_page(&uri).await)
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    async fn run_page(&mut self, uri: &str) -> PageOutcome {
        let page = self.controller.state().current_page;
        self.document.lock().await.loader_mut().show(LOADING_POSTS_MESSAGE);

        let result = self.loader.load_page(uri).await;

        let outcome = {
            let mut doc = self.document.lock().await;
            let outcome = self.apply_page(doc.posts_mut(), page, result);
            doc.loader_mut().hide();
            outcome
        };

        self.controller.settle(&outcome);
        outcome
    }

    fn apply_page(
        &self,
        feed: &mut FeedContainer,
        page: u32,
        result: Result<Vec<NormalizedPost>, FetchFailure>,
    ) -> PageOutcome {
        match result {
            Ok(posts) if posts.is_empty() => {
                tracing::info!("📭 Page {} returned no posts", page);
                PageOutcome::Exhausted { page }
            }
            Ok(posts) => {
                feed.commit(self.template.render_page(&posts));
                tracing::info!("📄 Rendered page {} ({} posts)", page, posts.len());
                PageOutcome::Rendered {
                    page,
                    posts: posts.len(),
                }
            }
            Err(failure) => {
                tracing::warn!("❌ Page {} failed: {}", page, failure);
                feed.append_error(render_error(&failure, &self.options.error_tag));
                PageOutcome::Failed { page, failure }
            }
        }
    }
}

impl<T: Transport> Drop for FeedSession<T> {
    fn drop(&mut self) {
        self.controller.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initial(posts: PageOutcome) -> InitialLoad {
        InitialLoad { site: Ok(()), posts }
    }

    #[test]
    fn test_should_observe_after_first_page() {
        assert!(initial(PageOutcome::Rendered { page: 1, posts: 4 }).should_observe(true));
        assert!(!initial(PageOutcome::Exhausted { page: 1 }).should_observe(false));

        let failed = initial(PageOutcome::Failed {
            page: 1,
            failure: FetchFailure::parse("bad json"),
        });
        assert!(!failed.should_observe(true));
        assert!(failed.should_observe(false));
    }

    #[test]
    fn test_new_session_points_at_first_page() {
        struct Unreachable;

        #[async_trait::async_trait]
        impl Transport for Unreachable {
            async fn get(&self, uri: &str) -> Result<crate::domain::ports::HttpResponse, FetchFailure> {
                Err(FetchFailure::network("NetworkError", uri))
            }
        }

        let session = FeedSession::new(
            "https://example.com",
            Arc::new(Unreachable),
            crate::core::document::Document::shared(),
            FeedOptions::default(),
        );

        assert_eq!(
            session.registry().get_resource(POSTS_RESOURCE),
            Some("https://example.com/wp-json/wp/v2/posts?_embed&per_page=4")
        );
        assert_eq!(session.pagination().current_page, 1);
        assert!(!session.controller().is_active());
    }
}
