use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A single `<a>` element as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub href: String,
    pub rel: BTreeSet<String>,
    pub anchor_text: String,
    pub css_classes: BTreeSet<String>,
}

impl RawLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: BTreeSet::new(),
            anchor_text: String::new(),
            css_classes: BTreeSet::new(),
        }
    }

    pub fn with_rel(mut self, rel: &str) -> Self {
        self.rel = tokenize(rel).map(|t| t.to_lowercase()).collect();
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.anchor_text = collapse_whitespace(text);
        self
    }

    pub fn with_classes(mut self, classes: &str) -> Self {
        self.css_classes = tokenize(classes).map(String::from).collect();
        self
    }

    pub fn has_rel(&self, token: &str) -> bool {
        self.rel.contains(token)
    }
}

/// One HTML file of the corpus, keyed by its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub canonical_url: String,
    pub source_path: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    pub links: Vec<RawLink>,
}

impl Page {
    pub fn new(canonical_url: impl Into<String>) -> Self {
        Self {
            canonical_url: canonical_url.into(),
            source_path: PathBuf::new(),
            title: None,
            description: None,
            links: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = non_empty(title);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = non_empty(description);
        self
    }

    pub fn with_link(mut self, link: RawLink) -> Self {
        self.links.push(link);
        self
    }
}

pub(crate) fn tokenize(value: &str) -> impl Iterator<Item = &str> {
    value.split_whitespace()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace and maps an empty result to `None`.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
