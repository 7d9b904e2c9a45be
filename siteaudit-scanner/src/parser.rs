//! HTML page parsing.
//!
//! Documents are parsed with `scraper` (html5ever), which recovers from
//! unclosed and misnested tags the way browsers do. The resulting tree is
//! replayed through a [`TagSink`] so extractors only deal with start tags,
//! text and end tags in document order.

use crate::page::{Page, RawLink, collapse_whitespace, non_empty};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node};
use std::path::PathBuf;
use tracing::trace;

/// Receives a document as a stream of tokens.
pub trait TagSink {
    fn on_start_tag(&mut self, element: &Element);
    fn on_text(&mut self, text: &str);
    fn on_end_tag(&mut self, name: &str);
}

/// Parse `html` and feed every element and text node to `sink`.
pub fn replay<S: TagSink>(html: &str, sink: &mut S) {
    let document = Html::parse_document(html);
    walk(document.root_element(), sink);
}

fn walk<S: TagSink>(element: ElementRef<'_>, sink: &mut S) {
    sink.on_start_tag(element.value());
    for child in element.children() {
        match child.value() {
            Node::Text(text) => sink.on_text(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    walk(child_element, sink);
                }
            }
            _ => {}
        }
    }
    sink.on_end_tag(element.value().name());
}

struct PendingAnchor {
    href: String,
    rel: String,
    classes: String,
    text: String,
}

/// Collects title, meta description and anchors from a token stream.
#[derive(Default)]
pub struct PageExtractor {
    title: Option<String>,
    title_buffer: Option<String>,
    description: Option<String>,
    anchors: Vec<PendingAnchor>,
    links: Vec<RawLink>,
    raw_text_depth: usize,
}

impl PageExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the extractor and build the page record.
    pub fn into_page(mut self, canonical_url: String, source_path: PathBuf) -> Page {
        // Unclosed anchors still count
        while let Some(anchor) = self.anchors.pop() {
            self.links.push(finish_anchor(anchor));
        }
        if self.title.is_none()
            && let Some(buffer) = self.title_buffer.take()
        {
            self.title = non_empty(&buffer);
        }

        Page {
            canonical_url,
            source_path,
            title: self.title,
            description: self.description,
            links: self.links,
        }
    }
}

impl TagSink for PageExtractor {
    fn on_start_tag(&mut self, element: &Element) {
        match element.name() {
            "script" | "style" => self.raw_text_depth += 1,
            "title" if self.title.is_none() && self.title_buffer.is_none() => {
                self.title_buffer = Some(String::new());
            }
            "meta" if self.description.is_none() => {
                let is_description = element
                    .attr("name")
                    .map(|name| name.trim().eq_ignore_ascii_case("description"))
                    .unwrap_or(false);
                if is_description {
                    self.description = element.attr("content").and_then(non_empty);
                }
            }
            "a" => {
                if let Some(href) = element.attr("href") {
                    self.anchors.push(PendingAnchor {
                        href: href.trim().to_string(),
                        rel: element.attr("rel").unwrap_or_default().to_string(),
                        classes: element.attr("class").unwrap_or_default().to_string(),
                        text: String::new(),
                    });
                }
            }
            _ => {}
        }
    }

    fn on_text(&mut self, text: &str) {
        if self.raw_text_depth > 0 {
            return;
        }
        if let Some(buffer) = self.title_buffer.as_mut() {
            buffer.push_str(text);
        }
        for anchor in self.anchors.iter_mut() {
            anchor.text.push_str(text);
        }
    }

    fn on_end_tag(&mut self, name: &str) {
        match name {
            "script" | "style" => self.raw_text_depth = self.raw_text_depth.saturating_sub(1),
            "title" => {
                if let Some(buffer) = self.title_buffer.take() {
                    self.title = non_empty(&buffer);
                    // An empty first title still counts as the first title
                    if self.title.is_none() {
                        self.title = Some(String::new());
                    }
                }
            }
            "a" => {
                if let Some(anchor) = self.anchors.pop() {
                    self.links.push(finish_anchor(anchor));
                }
            }
            _ => {}
        }
    }
}

fn finish_anchor(anchor: PendingAnchor) -> RawLink {
    trace!("Found link: {}", anchor.href);
    let mut link = RawLink::new(anchor.href)
        .with_rel(&anchor.rel)
        .with_classes(&anchor.classes);
    link.anchor_text = collapse_whitespace(&anchor.text);
    link
}

/// Parse one HTML document into a [`Page`].
pub fn parse_page(canonical_url: impl Into<String>, source_path: PathBuf, html: &str) -> Page {
    let mut extractor = PageExtractor::new();
    replay(html, &mut extractor);
    let mut page = extractor.into_page(canonical_url.into(), source_path);
    // An empty <title></title> is reported as missing
    if page.title.as_deref() == Some("") {
        page.title = None;
    }
    page
}
