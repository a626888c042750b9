use crate::core::dom::Element;
use crate::core::terms::{collect_labels, TermKind};
use crate::domain::model::{Author, NormalizedPost, Post, Term};
use crate::utils::error::FetchFailure;
use chrono::{DateTime, Local, NaiveDateTime};
use std::fmt::{Display, Write};

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";
pub const MISSING_DATE: &str = "--/--/--";
pub const MISSING_IMAGE_ALT: &str = "Post image not found";
const EXCERPT_ELLIPSIS: &str = "[&hellip;]";
const PREFERRED_AVATAR_SIZE: &str = "48";

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub date_format: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// 將 API 文章投影成可渲染的欄位。
///
/// 有備援值的欄位缺漏時使用備援值；`_embedded`、作者或 `wp:term`
/// 整個不存在代表請求沒有帶 `_embed`，回傳 [`FetchFailure::Parse`]。
pub fn normalize_post(post: &Post, options: &NormalizeOptions) -> Result<NormalizedPost, FetchFailure> {
    let embedded = post.embedded.as_ref().ok_or_else(|| {
        FetchFailure::parse(format!(
            "post {} has no _embedded data; the posts request must include _embed",
            post.id
        ))
    })?;

    let author = embedded.author.first().ok_or_else(|| {
        FetchFailure::parse(format!("post {} has no embedded author", post.id))
    })?;

    let term_groups = embedded.terms.as_ref().ok_or_else(|| {
        FetchFailure::parse(format!("post {} has no embedded wp:term data", post.id))
    })?;

    let media = embedded.featured_media.first();

    let image_url = media
        .and_then(|m| non_empty(m.source_url.as_deref()))
        .or_else(|| non_empty(post.jetpack_featured_media_url.as_deref()))
        .unwrap_or_default()
        .to_string();

    let image_alt = media
        .and_then(|m| non_empty(m.alt_text.as_deref()))
        .unwrap_or(MISSING_IMAGE_ALT)
        .to_string();

    Ok(NormalizedPost {
        image_url,
        image_alt,
        title: post.title.rendered.clone(),
        author_html: author_block(author),
        date: format_date(post.date.as_deref(), &options.date_format),
        link: post.link.clone(),
        excerpt_html: normalize_excerpt(&post.excerpt.rendered),
        categories: collect_labels(term_group(term_groups, 0), TermKind::Category),
        tags: collect_labels(term_group(term_groups, 1), TermKind::Tag),
        content_html: post.content.rendered.clone(),
    })
}

pub fn normalize_posts(posts: &[Post], options: &NormalizeOptions) -> Result<Vec<NormalizedPost>, FetchFailure> {
    posts.iter().map(|post| normalize_post(post, options)).collect()
}

pub fn normalize_excerpt(excerpt: &str) -> String {
    excerpt.replace(EXCERPT_ELLIPSIS, "...")
}

/// WordPress 的 `date` 是網站時區的 naive 時間；帶時區的字串會換成本地時間
pub fn format_date(date: Option<&str>, format: &str) -> String {
    let Some(raw) = non_empty(date) else {
        return MISSING_DATE.to_string();
    };

    let formatted = if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        render_date(naive.format(format))
    } else {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => render_date(dt.with_timezone(&Local).format(format)),
            Err(e) => {
                tracing::debug!("Unparseable post date '{}': {}", raw, e);
                None
            }
        }
    };

    formatted.unwrap_or_else(|| MISSING_DATE.to_string())
}

/// chrono 遇到無效的格式時 `Display` 會回傳錯誤，`to_string()` 會 panic
fn render_date(formatted: impl Display) -> Option<String> {
    let mut out = String::new();
    match write!(out, "{}", formatted) {
        Ok(()) => Some(out),
        Err(_) => {
            tracing::warn!("Invalid date format; rendering {}", MISSING_DATE);
            None
        }
    }
}

fn author_block(author: &Author) -> String {
    let avatar = author
        .avatar_urls
        .get(PREFERRED_AVATAR_SIZE)
        .or_else(|| author.avatar_urls.values().next())
        .map(String::as_str)
        .unwrap_or_default();

    let avatar = Element::new("img")
        .with_attr("src", avatar)
        .with_attr("alt", author.name.as_str());
    let caption = Element::new("figcaption").with_text(author.name.as_str());
    format!("{}{}", avatar.to_html(), caption.to_html())
}

fn term_group(groups: &[Vec<Term>], index: usize) -> &[Term] {
    groups.get(index).map(Vec::as_slice).unwrap_or_default()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
