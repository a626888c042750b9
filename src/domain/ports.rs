use crate::utils::error::{FetchFailure, Result};
use async_trait::async_trait;
use std::time::Duration;

/// 已讀取完畢的 HTTP 回應
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 對外的 HTTP 連接埠：每次呼叫只做一次 GET，不做快取
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, uri: &str) -> std::result::Result<HttpResponse, FetchFailure>;
}

/// 輸出端口: 把渲染好的頁面寫到某處
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn site_url(&self) -> &str;
    fn per_page(&self) -> usize;
    /// 包含第一頁在內的最多頁數
    fn max_pages(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn halt_on_failure(&self) -> bool;
    fn error_tag(&self) -> &str;
    fn date_format(&self) -> &str;
    fn output_path(&self) -> &str;
}
