use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// WordPress 的 `{ "rendered": "..." }` 欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// `GET {domain}/wp-json` 回傳的網站資訊
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timezone_string: Option<String>,
}

/// `GET /wp/v2/posts?_embed` 回傳的單篇文章（只保留會用到的欄位）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub jetpack_featured_media_url: Option<String>,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub author: Vec<Author>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<FeaturedMedia>,
    /// `[categories, tags, ...其他自訂分類]`
    #[serde(rename = "wp:term", default)]
    pub terms: Option<Vec<Vec<Term>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    /// 以尺寸（"24"、"48"、"96"）為 key 的頭像網址
    #[serde(default)]
    pub avatar_urls: BTreeMap<String, String>,
}

/// 特色圖片；沒有權限時 WordPress 會回傳錯誤物件，所以全部欄位都是可選的
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturedMedia {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub taxonomy: Option<String>,
}

impl Term {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            taxonomy: None,
        }
    }
}

/// 可直接填入模板的文章欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedPost {
    pub image_url: String,
    pub image_alt: String,
    pub title: String,
    pub author_html: String,
    pub date: String,
    pub link: String,
    pub excerpt_html: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub content_html: String,
}
