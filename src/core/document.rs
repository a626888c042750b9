use crate::core::dom::{escape_text, Element, Node};
use crate::core::render::ERROR_CLASS;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedDocument = Arc<Mutex<Document>>;

pub const LOADING_SITE_MESSAGE: &str = "Loading site...";
pub const LOADING_POSTS_MESSAGE: &str = "Loading posts...";

/// 文章列表容器，只允許附加
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedContainer {
    element: Element,
    batches: usize,
}

impl Default for FeedContainer {
    fn default() -> Self {
        Self {
            element: Element::new("section").with_attr("id", "posts"),
            batches: 0,
        }
    }
}

impl FeedContainer {
    /// 一整頁的節點一次附加
    pub fn commit(&mut self, subtrees: Vec<Node>) {
        if subtrees.is_empty() {
            return;
        }
        self.element.append_children(subtrees);
        self.batches += 1;
    }

    pub fn append_error(&mut self, error: Node) {
        self.element.append_child(error);
    }

    pub fn clear(&mut self) {
        self.element.remove_all_children();
        self.batches = 0;
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// 已提交的批次數（每頁一次）
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn posts(&self) -> Vec<&Element> {
        self.element.query_selector_all("#posts > .post")
    }

    pub fn errors(&self) -> Vec<&Element> {
        self.element
            .query_selector_all(&format!("#posts > .{}", ERROR_CLASS))
    }

    pub fn is_empty(&self) -> bool {
        self.element.children().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderIndicator {
    visible: bool,
    message: String,
}

impl LoaderIndicator {
    pub fn show(&mut self, message: &str) {
        self.visible = true;
        self.message = message.to_string();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn to_element(&self) -> Element {
        let display = if self.visible { "block" } else { "none" };
        Element::new("div")
            .with_class("loader")
            .with_attr("style", format!("display: {}", display))
            .with_child(Element::new("h2").with_text(self.message.as_str()))
    }
}

/// 整個頁面: 網站資訊區、文章區與載入提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    site: Element,
    posts: FeedContainer,
    loader: LoaderIndicator,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            site: Element::new("section").with_attr("id", "site"),
            posts: FeedContainer::default(),
            loader: LoaderIndicator::default(),
        }
    }
}

impl Document {
    pub fn shared() -> SharedDocument {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn site(&self) -> &Element {
        &self.site
    }

    pub fn site_mut(&mut self) -> &mut Element {
        &mut self.site
    }

    pub fn posts(&self) -> &FeedContainer {
        &self.posts
    }

    pub fn posts_mut(&mut self) -> &mut FeedContainer {
        &mut self.posts
    }

    pub fn loader(&self) -> &LoaderIndicator {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut LoaderIndicator {
        &mut self.loader
    }

    /// 新的表單送出前清空兩個區塊
    pub fn reset(&mut self) {
        self.site.remove_all_children();
        self.posts.clear();
        self.loader.hide();
    }

    pub fn to_html(&self, title: &str) -> String {
        let main = Element::new("main")
            .with_child(self.site.clone())
            .with_child(self.posts.element().clone())
            .with_child(self.loader.to_element());

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_text(title),
            main.to_html()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_node(title: &str) -> Node {
        Element::new("article")
            .with_class("post")
            .with_text(title)
            .into()
    }

    #[test]
    fn test_commit_appends_in_one_batch() {
        let mut feed = FeedContainer::default();
        feed.commit(vec![post_node("a"), post_node("b")]);
        feed.commit(vec![post_node("c")]);
        feed.commit(Vec::new());

        assert_eq!(feed.batches(), 2);
        let titles: Vec<String> = feed.posts().iter().map(|p| p.text_content()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_posts_and_errors_are_top_level_only() {
        let mut feed = FeedContainer::default();
        let nested = Element::new("article")
            .with_class("post")
            .with_child(Element::new("div").with_class("post").with_text("quoted"));
        feed.commit(vec![nested.into(), post_node("b")]);
        let error = Element::new("h2").with_class(ERROR_CLASS).with_text("Error 500: Oops");
        feed.append_error(error.into());

        assert_eq!(feed.posts().len(), 2);
        assert_eq!(feed.errors().len(), 1);
        assert_eq!(feed.errors()[0].text_content(), "Error 500: Oops");
    }

    #[test]
    fn test_reset_clears_sections() {
        let mut doc = Document::default();
        doc.site_mut().append_child(Element::new("h3").with_text("Website"));
        doc.posts_mut().commit(vec![post_node("a")]);
        doc.loader_mut().show(LOADING_POSTS_MESSAGE);

        doc.reset();

        assert!(doc.site().children().is_empty());
        assert!(doc.posts().is_empty());
        assert!(!doc.loader().is_visible());
    }

    #[test]
    fn test_to_html_contains_sections() {
        let mut doc = Document::default();
        doc.posts_mut().commit(vec![post_node("a")]);
        let html = doc.to_html("Feed <demo>");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Feed &lt;demo&gt;</title>"));
        assert!(html.contains("<section id=\"site\"></section>"));
        assert!(html.contains("<section id=\"posts\"><article class=\"post\">a</article></section>"));
        assert!(html.contains("<div class=\"loader\" style=\"display: none\"><h2></h2></div>"));
    }
}
