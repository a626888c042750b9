//! 無頭（headless）DOM 模型。
//!
//! 只支援 feed 需要的部分: 元素、屬性、文字節點（序列化時跳脫）、
//! 原始 HTML 片段（照原樣輸出），以及一個小型的選擇器引擎
//! （`tag`、`.class`、`#id`、`tag.class`，子代 `>` 與後代空白組合子）。

use pulldown_cmark::escape::{escape_href, escape_html};
use std::fmt::Write;

/// 值是網址的屬性
const URL_ATTRIBUTES: &[&str] = &["href", "src"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// 受信任的 HTML 片段（WordPress 已經渲染好的內容）
    Markup(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text(text) => push_escaped(out, text),
            Node::Markup(markup) => out.push_str(markup),
        }
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Node::Element(el) => {
                for child in &el.children {
                    child.write_text(out);
                }
            }
            Node::Text(text) | Node::Markup(text) => out.push_str(text),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attribute("class", joined);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn append_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn append_children(&mut self, children: impl IntoIterator<Item = Node>) {
        self.children.extend(children);
    }

    pub fn remove_all_children(&mut self) {
        self.children.clear();
    }

    /// 等同 `textContent = text`
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// 等同 `innerHTML = markup`（不跳脫）
    pub fn set_inner_html(&mut self, markup: impl Into<String>) {
        self.children = vec![Node::Markup(markup.into())];
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_text(&mut out);
        }
        out
    }

    pub fn query_selector(&self, selector: &str) -> Option<&Element> {
        let selector = Selector::parse(selector)?;
        let path = self.find_path(&selector)?;
        Some(self.at_path(&path))
    }

    pub fn query_selector_mut(&mut self, selector: &str) -> Option<&mut Element> {
        let selector = Selector::parse(selector)?;
        let path = self.find_path(&selector)?;
        Some(self.at_path_mut(&path))
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<&Element> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        let mut ancestors = vec![self];
        collect_matches(self, &selector, &mut ancestors, &mut found);
        found
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out);
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"", name);
            if URL_ATTRIBUTES.contains(&name.as_str()) {
                push_escaped_href(out, value);
            } else {
                push_escaped(out, value);
            }
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    /// 深度優先，回傳第一個符合元素的子節點索引路徑
    fn find_path(&self, selector: &Selector) -> Option<Vec<usize>> {
        let mut ancestors = vec![self];
        let mut path = Vec::new();
        if find_first(self, selector, &mut ancestors, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn at_path(&self, path: &[usize]) -> &Element {
        path.iter().fold(self, |el, &i| match &el.children[i] {
            Node::Element(child) => child,
            _ => unreachable!("path only indexes element children"),
        })
    }

    fn at_path_mut(&mut self, path: &[usize]) -> &mut Element {
        let mut el = self;
        for &i in path {
            el = match &mut el.children[i] {
                Node::Element(child) => child,
                _ => unreachable!("path only indexes element children"),
            };
        }
        el
    }
}

fn find_first<'a>(
    parent: &'a Element,
    selector: &Selector,
    ancestors: &mut Vec<&'a Element>,
    path: &mut Vec<usize>,
) -> bool {
    for (i, child) in parent.children.iter().enumerate() {
        let Node::Element(el) = child else { continue };
        path.push(i);
        if selector.matches(el, ancestors) {
            return true;
        }
        ancestors.push(el);
        let found = find_first(el, selector, ancestors, path);
        ancestors.pop();
        if found {
            return true;
        }
        path.pop();
    }
    false
}

fn collect_matches<'a>(
    parent: &'a Element,
    selector: &Selector,
    ancestors: &mut Vec<&'a Element>,
    found: &mut Vec<&'a Element>,
) {
    for el in parent.child_elements() {
        if selector.matches(el, ancestors) {
            found.push(el);
        }
        ancestors.push(el);
        collect_matches(el, selector, ancestors, found);
        ancestors.pop();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Child,
    Descendant,
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(token: &str) -> Option<Self> {
        let mut compound = Compound::default();
        let mut rest = token;

        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        if tag_end > 0 {
            compound.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '.' => compound.classes.push(name.to_string()),
                '#' => compound.id = Some(name.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }

        Some(compound)
    }

    fn matches(&self, el: &Element) -> bool {
        self.tag.as_deref().map_or(true, |tag| tag == "*" || tag == el.tag)
            && self.id.as_deref().map_or(true, |id| el.id() == Some(id))
            && self.classes.iter().all(|c| el.has_class(c))
    }
}

#[derive(Debug)]
struct Selector {
    /// 每個 compound 與它和前一個 compound 之間的組合子
    parts: Vec<(Compound, Combinator)>,
}

impl Selector {
    fn parse(source: &str) -> Option<Self> {
        let spaced = source.replace('>', " > ");
        let mut parts = Vec::new();
        let mut pending = Combinator::Descendant;

        for token in spaced.split_whitespace() {
            if token == ">" {
                if parts.is_empty() {
                    return None;
                }
                pending = Combinator::Child;
                continue;
            }
            parts.push((Compound::parse(token)?, pending));
            pending = Combinator::Descendant;
        }

        if parts.is_empty() || pending == Combinator::Child {
            return None;
        }
        Some(Self { parts })
    }

    fn matches(&self, el: &Element, ancestors: &[&Element]) -> bool {
        self.matches_at(self.parts.len() - 1, el, ancestors)
    }

    fn matches_at(&self, idx: usize, el: &Element, ancestors: &[&Element]) -> bool {
        let (compound, combinator) = &self.parts[idx];
        if !compound.matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match combinator {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => self.matches_at(idx - 1, parent, rest),
                None => false,
            },
            Combinator::Descendant => (0..ancestors.len())
                .rev()
                .any(|i| self.matches_at(idx - 1, ancestors[i], &ancestors[..i])),
        }
    }
}

/// 以 HTML 跳脫後寫入 `out`（文字節點與一般屬性值）
pub fn push_escaped(out: &mut String, text: &str) {
    // 寫入 String 不會失敗
    let _ = escape_html(&mut *out, text);
}

/// 網址屬性: 百分比編碼不安全的字元，並跳脫 `&` 與 `'`
pub fn push_escaped_href(out: &mut String, url: &str) {
    let _ = escape_href(&mut *out, url);
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}
