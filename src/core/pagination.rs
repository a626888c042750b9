//! 捲動觸發的分頁控制器。
//!
//! 狀態: `Idle → Observing → (Fetching → Observing)* → Disconnected`。
//! 每次哨兵「進入」畫面只前進一頁；頁面結算（[`PaginationController::settle`]）
//! 之前不會再讀取下一個可見度事件，因此同一頁不會同時被請求兩次。

use crate::core::registry::{posts_route, ResourceRegistry, POSTS_RESOURCE};
use crate::core::sentinel::{Sentinel, SentinelObserver, VisibilityEntry};
use crate::utils::error::FetchFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Observing,
    Fetching,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub active: bool,
}

/// 一頁的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Rendered { page: u32, posts: usize },
    /// 回傳空列表，已經沒有更多文章
    Exhausted { page: u32 },
    Failed { page: u32, failure: FetchFailure },
}

impl PageOutcome {
    pub fn page(&self) -> u32 {
        match self {
            PageOutcome::Rendered { page, .. }
            | PageOutcome::Exhausted { page }
            | PageOutcome::Failed { page, .. } => *page,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PageOutcome::Failed { .. })
    }
}

#[derive(Debug)]
pub struct PaginationController {
    state: PaginationState,
    phase: ControllerPhase,
    per_page: usize,
    halt_on_failure: bool,
    observer: Option<SentinelObserver>,
    sentinel_visible: bool,
}

impl PaginationController {
    /// `initial_page` 是已經載入的頁數，第一次觸發會請求 `initial_page + 1`
    pub fn new(initial_page: u32, per_page: usize, halt_on_failure: bool) -> Self {
        Self {
            state: PaginationState {
                current_page: initial_page.max(1),
                active: false,
            },
            phase: ControllerPhase::Idle,
            per_page,
            halt_on_failure,
            observer: None,
            sentinel_visible: false,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn start(&mut self, sentinel: &Sentinel) {
        if self.phase == ControllerPhase::Disconnected {
            tracing::warn!("Pagination controller already disconnected; not observing again");
            return;
        }

        if let Some(mut previous) = self.observer.take() {
            previous.disconnect();
        }

        self.observer = Some(sentinel.observe());
        self.sentinel_visible = false;
        self.phase = ControllerPhase::Observing;
        self.state.active = true;
        tracing::debug!("Observing sentinel from page {}", self.state.current_page);
    }

    /// 終止狀態；之後的可見度事件不會再送到這個控制器
    pub fn cancel(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
        if self.phase != ControllerPhase::Disconnected {
            tracing::debug!("Pagination disconnected at page {}", self.state.current_page);
        }
        self.phase = ControllerPhase::Disconnected;
        self.state.active = false;
    }

    /// 套用一個可見度事件。只有「隱藏 → 可見」的轉換會前進一頁，
    /// 並把登錄表的 posts 資源改寫成新頁面；回傳要請求的網址。
    pub fn accept_visibility(
        &mut self,
        entry: VisibilityEntry,
        registry: &mut ResourceRegistry,
    ) -> Option<String> {
        if self.phase != ControllerPhase::Observing {
            return None;
        }

        let was_visible = std::mem::replace(&mut self.sentinel_visible, entry.is_intersecting);
        if !entry.is_intersecting || was_visible {
            return None;
        }

        self.state.current_page += 1;
        self.phase = ControllerPhase::Fetching;

        let uri = registry
            .set_resource(POSTS_RESOURCE, &posts_route(self.per_page, self.state.current_page))
            .to_string();
        tracing::debug!("Sentinel visible, requesting page {}", self.state.current_page);
        Some(uri)
    }

    /// 等到下一次觸發；斷線時回傳 `None`
    pub async fn next_page_uri(&mut self, registry: &mut ResourceRegistry) -> Option<String> {
        while self.phase == ControllerPhase::Observing {
            let Some(entry) = self.next_entry().await else {
                self.cancel();
                return None;
            };
            if let Some(uri) = self.accept_visibility(entry, registry) {
                return Some(uri);
            }
        }
        None
    }

    /// 只處理已排隊的事件，不等待
    pub fn poll_page_uri(&mut self, registry: &mut ResourceRegistry) -> Option<String> {
        while self.phase == ControllerPhase::Observing {
            let entry = self.observer.as_mut()?.try_next_entry()?;
            if let Some(uri) = self.accept_visibility(entry, registry) {
                return Some(uri);
            }
        }
        None
    }

    /// 頁面完成後回到 `Observing`；沒有更多文章、或失敗且設定為停止時斷線
    pub fn settle(&mut self, outcome: &PageOutcome) {
        if self.phase != ControllerPhase::Fetching {
            return;
        }

        match outcome {
            PageOutcome::Rendered { .. } => self.phase = ControllerPhase::Observing,
            PageOutcome::Exhausted { page } => {
                tracing::info!("No more posts after page {}", page.saturating_sub(1));
                self.cancel();
            }
            PageOutcome::Failed { page, failure } => {
                if self.halt_on_failure {
                    tracing::warn!("Page {} failed ({}); pagination halted", page, failure);
                    self.cancel();
                } else {
                    tracing::warn!("Page {} failed ({}); still observing", page, failure);
                    self.phase = ControllerPhase::Observing;
                }
            }
        }
    }

    async fn next_entry(&mut self) -> Option<VisibilityEntry> {
        self.observer.as_mut()?.next_entry().await
    }
}
