//! WordPress REST 資源網址登錄表。
//!
//! 純字串組合，不做任何網路存取。
//! 參考: <https://developer.wordpress.org/rest-api/reference/>

use std::collections::HashMap;

/// 文章資源在登錄表中的名稱
pub const POSTS_RESOURCE: &str = "posts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRegistry {
    domain: String,
    api_root: String,
    base_api_root: String,
    resources: HashMap<String, String>,
}

impl ResourceRegistry {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        let api_root = format!("{}/wp-json", domain);
        let base_api_root = format!("{}/wp/v2", api_root);

        Self {
            domain,
            api_root,
            base_api_root,
            resources: HashMap::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `{domain}/wp-json`，網站資訊端點
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// `{domain}/wp-json/wp/v2`
    pub fn base_api_root(&self) -> &str {
        &self.base_api_root
    }

    pub fn all_resources(&self) -> &HashMap<String, String> {
        &self.resources
    }

    /// 設定或覆寫資源網址（後寫入者勝），回傳新的完整網址
    pub fn set_resource(&mut self, name: &str, route_fragment: &str) -> &str {
        let uri = format!("{}{}", self.base_api_root, route_fragment);
        tracing::debug!("Resource '{}' -> {}", name, uri);
        let slot = self.resources.entry(name.to_string()).or_default();
        *slot = uri;
        slot.as_str()
    }

    pub fn get_resource(&self, name: &str) -> Option<&str> {
        self.resources.get(name).map(String::as_str)
    }

    pub fn delete_resource(&mut self, name: &str) -> Option<String> {
        self.resources.remove(name)
    }
}

/// 文章列表的路由片段；第一頁不帶 `page` 參數
pub fn posts_route(per_page: usize, page: u32) -> String {
    if page <= 1 {
        format!("/posts?_embed&per_page={}", per_page)
    } else {
        format!("/posts?_embed&per_page={}&page={}", per_page, page)
    }
}

/// `first..=last` 的頁碼；超出 `u32` 的部分直接截止，不會繞回
pub fn page_range(first: usize, last: usize) -> impl Iterator<Item = u32> {
    (first..=last).map_while(|page| u32::try_from(page).ok())
}
