use crate::app::session::{FeedOptions, FeedSession, InitialLoad};
use crate::core::document::{Document, SharedDocument};
use crate::core::pagination::PageOutcome;
use crate::core::sentinel::Sentinel;
use crate::domain::ports::Transport;
use crate::utils::error::{FeedError, FetchFailure, Result};
use crate::utils::validation::validate_url;
use std::sync::Arc;

/// 長期存在的應用程式: 擁有文件、哨兵與目前的 session。
///
/// 同一時間最多只有一個觀察中的控制器；新的送出一定先斷開舊的。
pub struct FeedApp<T: Transport> {
    transport: Arc<T>,
    document: SharedDocument,
    sentinel: Sentinel,
    options: FeedOptions,
    session: Option<FeedSession<T>>,
}

impl<T: Transport> FeedApp<T> {
    pub fn new(transport: Arc<T>, options: FeedOptions) -> Self {
        Self {
            transport,
            document: Document::shared(),
            sentinel: Sentinel::new(),
            options,
            session: None,
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    pub fn session(&self) -> Option<&FeedSession<T>> {
        self.session.as_ref()
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    /// 表單送出: 斷開舊 session、清空文件、載入網站資訊與第一頁，然後開始觀察哨兵。
    /// 空白網址只會斷開舊 session 並回傳驗證錯誤。
    pub async fn submit(&mut self, link: &str) -> Result<InitialLoad> {
        self.disconnect();

        let domain = normalize_site_link(link);
        if domain.is_empty() {
            tracing::warn!("Empty site link submitted; pagination stopped");
            return Err(FeedError::ValidationError {
                message: "Site link cannot be empty".to_string(),
            });
        }
        validate_url("site_url", domain)?;

        self.document.lock().await.reset();
        tracing::info!("🚀 Loading WordPress feed from {}", domain);

        let mut session = FeedSession::new(
            domain,
            self.transport.clone(),
            self.document.clone(),
            self.options.clone(),
        );
        let initial = session.load_initial().await;

        if initial.should_observe(self.options.halt_on_failure) {
            session.start_observing(&self.sentinel);
        }
        self.session = Some(session);

        Ok(initial)
    }

    /// 等待下一次哨兵觸發
    pub async fn advance(&mut self) -> Option<PageOutcome> {
        self.session.as_mut()?.advance().await
    }

    /// 處理已排隊的哨兵事件，不等待
    pub async fn advance_pending(&mut self) -> Option<PageOutcome> {
        self.session.as_mut()?.advance_pending().await
    }

    /// 無頭模式下的「捲到底」: 觸發一次哨兵轉換並處理結果
    pub async fn scroll_to_end(&mut self) -> Option<PageOutcome> {
        self.sentinel.scroll_into_view();
        self.advance_pending().await
    }

    pub fn is_paginating(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.controller().is_active())
    }

    /// 無頭執行: 送出網址後持續捲動，直到載入 `max_pages` 頁或分頁停止
    pub async fn load_pages(&mut self, link: &str, max_pages: usize) -> Result<FeedReport> {
        let initial = self.submit(link).await?;
        let mut pages = Vec::new();

        while 1 + pages.len() < max_pages && self.is_paginating() {
            match self.scroll_to_end().await {
                Some(outcome) => pages.push(outcome),
                None => break,
            }
        }

        Ok(FeedReport { initial, pages })
    }

    pub async fn render_html(&self) -> String {
        let title = match &self.session {
            Some(session) => format!("WordPress feed: {}", session.registry().domain()),
            None => "WordPress feed".to_string(),
        };
        self.document.lock().await.to_html(&title)
    }

    pub fn disconnect(&mut self) {
        if let Some(mut previous) = self.session.take() {
            previous.cancel();
            tracing::debug!(
                "Disconnected previous session for {}",
                previous.registry().domain()
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub initial: InitialLoad,
    pub pages: Vec<PageOutcome>,
}

impl FeedReport {
    fn outcomes(&self) -> impl Iterator<Item = &PageOutcome> {
        std::iter::once(&self.initial.posts).chain(self.pages.iter())
    }

    pub fn pages_loaded(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, PageOutcome::Rendered { .. }))
            .count()
    }

    pub fn posts_rendered(&self) -> usize {
        self.outcomes()
            .map(|o| match o {
                PageOutcome::Rendered { posts, .. } => *posts,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> Vec<&FetchFailure> {
        let site = self.initial.site.as_ref().err();
        site.into_iter()
            .chain(self.outcomes().filter_map(|o| match o {
                PageOutcome::Failed { failure, .. } => Some(failure),
                _ => None,
            }))
            .collect()
    }
}

/// 去掉前後空白與結尾的 `/`，讓 `{domain}/wp-json` 不會出現 `//`
pub fn normalize_site_link(link: &str) -> &str {
    link.trim().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_site_link() {
        assert_eq!(normalize_site_link(" https://example.com/ "), "https://example.com");
        assert_eq!(normalize_site_link("https://example.com//"), "https://example.com");
        assert_eq!(normalize_site_link("https://example.com/blog"), "https://example.com/blog");
        assert_eq!(normalize_site_link("   "), "");
    }
}
