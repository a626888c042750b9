use crate::core::dom::{Element, Node};
use crate::core::terms::{is_placeholder, TermKind};
use crate::domain::model::{NormalizedPost, SiteInfo};
use crate::utils::error::FetchFailure;

pub const ERROR_CLASS: &str = "fetch-error";

/// 文章模板。`render_post` 先複製再填值，主節點永遠不被修改。
#[derive(Debug, Clone)]
pub struct PostTemplate {
    master: Element,
}

impl Default for PostTemplate {
    fn default() -> Self {
        Self::new(default_post_master())
    }
}

impl PostTemplate {
    pub fn new(master: Element) -> Self {
        Self { master }
    }

    pub fn master(&self) -> &Element {
        &self.master
    }

    pub fn render_post(&self, post: &NormalizedPost) -> Node {
        let mut node = self.master.clone();

        if let Some(img) = node.query_selector_mut(".post-image") {
            img.set_attribute("src", post.image_url.as_str());
            img.set_attribute("alt", post.image_alt.as_str());
        }
        if let Some(title) = node.query_selector_mut(".post-title") {
            title.set_text(post.title.as_str());
        }
        if let Some(author) = node.query_selector_mut(".post-author") {
            author.set_inner_html(post.author_html.as_str());
        }
        if let Some(date) = node.query_selector_mut(".post-date") {
            date.set_text(post.date.as_str());
        }
        if let Some(link) = node.query_selector_mut(".post-link") {
            link.set_attribute("href", post.link.as_str());
        }
        if let Some(excerpt) = node.query_selector_mut(".post-excerpt") {
            excerpt.set_inner_html(post.excerpt_html.as_str());
        }
        if let Some(categories) = node.query_selector_mut(".post-categories") {
            fill_labels(categories, &post.categories, TermKind::Category);
        }
        if let Some(tags) = node.query_selector_mut(".post-tags") {
            fill_labels(tags, &post.tags, TermKind::Tag);
        }
        if let Some(article) = node.query_selector_mut(".post-content > article") {
            article.set_inner_html(post.content_html.as_str());
        }

        Node::Element(node)
    }

    pub fn render_page(&self, posts: &[NormalizedPost]) -> Vec<Node> {
        posts.iter().map(|post| self.render_post(post)).collect()
    }
}

/// `<p>Categories:</p><ul><li>..</li></ul>`；只有佔位文字時改成 `<p>(No categories)</p>`
fn fill_labels(slot: &mut Element, labels: &[String], kind: TermKind) {
    slot.remove_all_children();
    slot.append_child(Element::new("p").with_text(kind.heading()));

    let mut list = Element::new("ul");
    if is_placeholder(labels, kind) {
        list.append_child(Element::new("p").with_text(kind.placeholder()));
    } else {
        // 分類名稱是 WordPress 已編碼過的 HTML
        for label in labels {
            list.append_child(Element::new("li").with_child(Node::Markup(label.clone())));
        }
    }
    slot.append_child(list);
}

fn default_post_master() -> Element {
    Element::new("article")
        .with_class("post")
        .with_child(Element::new("img").with_class("post-image"))
        .with_child(Element::new("h2").with_class("post-title"))
        .with_child(Element::new("figure").with_class("post-author"))
        .with_child(Element::new("small").with_class("post-date"))
        .with_child(
            Element::new("a")
                .with_class("post-link")
                .with_attr("target", "_blank")
                .with_attr("rel", "noopener")
                .with_text("View original post"),
        )
        .with_child(Element::new("div").with_class("post-excerpt"))
        .with_child(Element::new("div").with_class("post-categories"))
        .with_child(Element::new("div").with_class("post-tags"))
        .with_child(
            Element::new("details")
                .with_class("post-content")
                .with_child(Element::new("summary").with_text("Read more"))
                .with_child(Element::new("article")),
        )
}

pub fn render_site_info(info: &SiteInfo) -> Vec<Node> {
    let url = info.url.as_deref().unwrap_or_default();
    let name = info.name.as_deref().unwrap_or_default();

    vec![
        Element::new("h3").with_text("Website").into(),
        Element::new("h2")
            .with_child(
                Element::new("a")
                    .with_attr("href", url)
                    .with_attr("target", "_blank")
                    .with_attr("rel", "noopener")
                    .with_child(Node::Markup(name.to_string())),
            )
            .into(),
        Element::new("p")
            .with_child(Node::Markup(
                info.description.clone().unwrap_or_default(),
            ))
            .into(),
        Element::new("p")
            .with_text(info.timezone_string.clone().unwrap_or_default())
            .into(),
    ]
}

pub fn render_error(failure: &FetchFailure, tag: &str) -> Node {
    Element::new(tag)
        .with_class(ERROR_CLASS)
        .with_text(failure.error_text())
        .into()
}
