use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const SENTINEL_CHANNEL_CAPACITY: usize = 64;

/// 落後時補上的事件。被丟掉的事件裡可能有一次「隱藏 → 可見」，
/// 回報隱藏讓下一個可見事件仍然算一次轉換。
const LAGGED_ENTRY: VisibilityEntry = VisibilityEntry {
    is_intersecting: false,
};

/// 一次可見度變化（對應 IntersectionObserverEntry）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub is_intersecting: bool,
}

/// 觸發下一頁的哨兵元素。每個觀察者都會收到所有可見度事件。
#[derive(Debug, Clone)]
pub struct Sentinel {
    tx: broadcast::Sender<VisibilityEntry>,
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new()
    }
}

impl Sentinel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SENTINEL_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn observe(&self) -> SentinelObserver {
        SentinelObserver {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// 回傳收到事件的觀察者數量
    pub fn set_visible(&self, is_intersecting: bool) -> usize {
        self.tx
            .send(VisibilityEntry { is_intersecting })
            .unwrap_or_default()
    }

    /// 模擬捲動到底部: 先離開畫面再進入畫面
    pub fn scroll_into_view(&self) -> usize {
        self.set_visible(false);
        self.set_visible(true)
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[derive(Debug)]
pub struct SentinelObserver {
    rx: Option<broadcast::Receiver<VisibilityEntry>>,
}

impl SentinelObserver {
    /// 等待下一個事件；斷線或哨兵被丟棄時回傳 `None`
    pub async fn next_entry(&mut self) -> Option<VisibilityEntry> {
        match self.rx.as_mut()?.recv().await {
            Ok(entry) => Some(entry),
            Err(RecvError::Lagged(skipped)) => Some(lagged(skipped)),
            Err(RecvError::Closed) => None,
        }
    }

    /// 不等待，只取出已排隊的事件
    pub fn try_next_entry(&mut self) -> Option<VisibilityEntry> {
        match self.rx.as_mut()?.try_recv() {
            Ok(entry) => Some(entry),
            Err(TryRecvError::Lagged(skipped)) => Some(lagged(skipped)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    pub fn disconnect(&mut self) {
        self.rx = None;
    }
}

fn lagged(skipped: u64) -> VisibilityEntry {
    tracing::warn!("Sentinel observer lagged, skipped {} events", skipped);
    LAGGED_ENTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_observer_receives_events() {
        let sentinel = Sentinel::new();
        let mut a = sentinel.observe();
        let mut b = sentinel.observe();

        assert_eq!(sentinel.set_visible(true), 2);
        assert_eq!(a.next_entry().await, Some(VisibilityEntry { is_intersecting: true }));
        assert_eq!(b.try_next_entry(), Some(VisibilityEntry { is_intersecting: true }));
        assert_eq!(b.try_next_entry(), None);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let sentinel = Sentinel::new();
        let mut observer = sentinel.observe();
        observer.disconnect();

        assert_eq!(sentinel.observer_count(), 0);
        assert_eq!(sentinel.set_visible(true), 0);
        assert_eq!(observer.try_next_entry(), None);
    }

    #[test]
    fn test_scroll_into_view_emits_transition() {
        let sentinel = Sentinel::new();
        let mut observer = sentinel.observe();

        sentinel.scroll_into_view();

        assert_eq!(observer.try_next_entry(), Some(VisibilityEntry { is_intersecting: false }));
        assert_eq!(observer.try_next_entry(), Some(VisibilityEntry { is_intersecting: true }));
    }

    #[tokio::test]
    async fn test_dropped_sentinel_closes_observer() {
        let sentinel = Sentinel::new();
        let mut observer = sentinel.observe();
        drop(sentinel);

        assert_eq!(observer.next_entry().await, None);
    }

    #[test]
    fn test_lagged_observer_reports_hidden_first() {
        let sentinel = Sentinel::new();
        let mut observer = sentinel.observe();

        sentinel.set_visible(false);
        for _ in 0..SENTINEL_CHANNEL_CAPACITY {
            sentinel.set_visible(true);
        }

        assert_eq!(observer.try_next_entry(), Some(LAGGED_ENTRY));
        assert_eq!(observer.try_next_entry(), Some(VisibilityEntry { is_intersecting: true }));
    }
}
