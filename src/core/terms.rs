use crate::domain::model::Term;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Tag,
}

impl TermKind {
    /// 該分類沒有任何項目時顯示的文字
    pub fn placeholder(self) -> &'static str {
        match self {
            TermKind::Category => "(No categories)",
            TermKind::Tag => "(No tags)",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            TermKind::Category => "Categories:",
            TermKind::Tag => "Tags:",
        }
    }
}

/// 依名稱去除重複、保留第一次出現的順序；空列表回傳佔位文字
pub fn collect_labels(terms: &[Term], kind: TermKind) -> Vec<String> {
    if terms.is_empty() {
        return vec![kind.placeholder().to_string()];
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(terms.len());
    terms
        .iter()
        .filter(|term| seen.insert(term.name.as_str()))
        .map(|term| term.name.clone())
        .collect()
}

/// `labels` 是否只有佔位文字
pub fn is_placeholder(labels: &[String], kind: TermKind) -> bool {
    matches!(labels, [only] if only == kind.placeholder())
}
