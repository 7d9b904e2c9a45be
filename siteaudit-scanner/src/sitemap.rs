use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

pub const SITEMAP_FILE: &str = "sitemap.xml";

static LOC_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("loc").expect("static selector"));

/// Extract every `<loc>` of a sitemap as a site path.
pub fn parse_sitemap(xml: &str) -> BTreeSet<String> {
    let document = Html::parse_document(xml);
    document
        .select(&LOC_SELECTOR)
        .filter_map(|loc| {
            let text: String = loc.text().collect();
            let path = loc_to_path(text.trim());
            if path.is_none() {
                warn!("Skipping invalid sitemap entry '{}'", text.trim());
            }
            path
        })
        .collect()
}

/// Reduce a `<loc>` value to its path: `https://site/x` -> `/x`.
pub fn loc_to_path(loc: &str) -> Option<String> {
    if loc.is_empty() {
        return None;
    }
    if loc.starts_with('/') {
        return Some(decode_path(loc));
    }
    let parsed = Url::parse(loc).ok()?;
    let path = parsed.path();
    if path.is_empty() {
        Some("/".to_string())
    } else {
        Some(decode_path(path))
    }
}

pub(crate) fn decode_path(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load `sitemap.xml` from the site root. `None` when absent or unreadable.
pub async fn load_sitemap(root: &Path) -> Option<BTreeSet<String>> {
    let path = root.join(SITEMAP_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            let urls = parse_sitemap(&content);
            debug!("Found {} URLs in {}", urls.len(), path.display());
            Some(urls)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No sitemap at {}", path.display());
            None
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
