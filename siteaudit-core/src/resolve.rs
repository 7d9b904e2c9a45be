//! URL resolution and matching against the known page set.

use crate::config::AuditConfig;
use serde::{Deserialize, Serialize};
use siteaudit_scanner::RedirectTable;
use std::collections::BTreeSet;
use tracing::trace;
use url::Url;

// Only the path of joined URLs is used, so the host is arbitrary
const RESOLUTION_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkKind {
    /// Matched a known page
    Internal,
    External { domain: String },
    Redirect,
    Broken,
    /// Static asset, never reported
    Resource,
    /// Non-navigable scheme or an absolute link to the site itself
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub source_url: String,
    pub target_url: Option<String>,
    pub kind: LinkKind,
}

impl ResolvedLink {
    fn new(source_url: &str, target_url: Option<String>, kind: LinkKind) -> Self {
        Self {
            source_url: source_url.to_string(),
            target_url,
            kind,
        }
    }
}

/// Drop `#fragment` and `?query` from an href.
pub fn strip_fragment_and_query(href: &str) -> &str {
    let end = href.find(['#', '?']).unwrap_or(href.len());
    &href[..end]
}

/// Lookup keys for a path, in match precedence order: exact, with a trailing
/// slash, without trailing slashes.
pub fn candidate_keys(path: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(3);
    let candidates = [
        path.to_string(),
        format!("{}/", path),
        path.trim_end_matches('/').to_string(),
    ];
    for candidate in candidates {
        if !candidate.is_empty() && !keys.contains(&candidate) {
            keys.push(candidate);
        }
    }
    keys
}

/// First key of `path` present in `known`.
pub fn match_known<'a>(path: &str, known: &'a BTreeSet<String>) -> Option<&'a String> {
    candidate_keys(path).iter().find_map(|key| known.get(key))
}

/// Whether `host` is `domain` or one of its subdomains, ignoring `www.`.
pub fn is_own_domain(host: &str, domain: &str) -> bool {
    let host = host.trim_start_matches("www.").to_ascii_lowercase();
    let domain = domain.trim_start_matches("www.").to_ascii_lowercase();
    !domain.is_empty() && (host == domain || host.ends_with(&format!(".{}", domain)))
}

fn has_http_scheme(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}

/// Absolute http(s) form of an href; protocol-relative hrefs become https.
fn absolute_form(href: &str) -> Option<String> {
    if href.starts_with("//") {
        Some(format!("https:{}", href))
    } else if has_http_scheme(href) {
        Some(href.to_string())
    } else {
        None
    }
}

/// Resolves hrefs against the canonical page set and redirect table.
pub struct Resolver<'a> {
    known_pages: &'a BTreeSet<String>,
    redirects: &'a RedirectTable,
    config: &'a AuditConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        known_pages: &'a BTreeSet<String>,
        redirects: &'a RedirectTable,
        config: &'a AuditConfig,
    ) -> Self {
        Self {
            known_pages,
            redirects,
            config,
        }
    }

    /// Resolve one href authored on `source_url`.
    ///
    /// Returns `None` for empty and fragment-only hrefs.
    pub fn resolve(&self, source_url: &str, href: &str) -> Option<ResolvedLink> {
        let stripped = strip_fragment_and_query(href.trim());
        if stripped.is_empty() {
            return None;
        }

        let absolute = absolute_form(stripped);

        if let Some(absolute) = absolute {
            return Some(self.resolve_absolute(source_url, &absolute));
        }

        // mailto:, tel:, javascript: and any other scheme
        if Url::parse(stripped).is_ok() {
            return Some(ResolvedLink::new(source_url, None, LinkKind::Ignored));
        }

        let Some(path) = resolve_path(source_url, stripped) else {
            trace!("Unresolvable href '{}' on {}", href, source_url);
            return Some(ResolvedLink::new(source_url, None, LinkKind::Ignored));
        };

        Some(self.classify_path(source_url, path))
    }

    fn resolve_absolute(&self, source_url: &str, absolute: &str) -> ResolvedLink {
        let host = Url::parse(absolute)
            .ok()
            .and_then(|url| url.host_str().map(String::from));
        match host {
            Some(host) if !is_own_domain(&host, &self.config.site_domain) => ResolvedLink::new(
                source_url,
                Some(absolute.to_string()),
                LinkKind::External { domain: host },
            ),
            _ => ResolvedLink::new(source_url, None, LinkKind::Ignored),
        }
    }

    fn classify_path(&self, source_url: &str, path: String) -> ResolvedLink {
        if let Some(page) = self.match_page(&path) {
            return ResolvedLink::new(source_url, Some(page.to_string()), LinkKind::Internal);
        }
        if let Some(redirect) = self.match_redirect(&path) {
            return ResolvedLink::new(source_url, Some(redirect), LinkKind::Redirect);
        }
        if self.config.is_resource(&path) {
            return ResolvedLink::new(source_url, Some(path), LinkKind::Resource);
        }
        ResolvedLink::new(source_url, Some(path), LinkKind::Broken)
    }

    pub fn match_page(&self, path: &str) -> Option<&'a str> {
        match_known(path, self.known_pages).map(String::as_str)
    }

    pub fn match_redirect(&self, path: &str) -> Option<String> {
        if let Some(key) = candidate_keys(path)
            .into_iter()
            .find(|key| self.redirects.contains(key))
        {
            return Some(key);
        }
        self.config
            .redirect_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            .then(|| path.to_string())
    }

    /// Destination of the `_redirects` rule for a matched redirect source.
    pub fn redirect_destination(&self, source: &str) -> Option<&'a str> {
        self.redirects.destination(source)
    }

    /// Whether `href` on `source_url` lands on the home page (anchors allowed).
    pub fn is_home_target(&self, source_url: &str, href: &str) -> bool {
        let stripped = strip_fragment_and_query(href.trim());
        if stripped.is_empty() {
            return false;
        }
        let absolute = absolute_form(stripped);

        let path = if let Some(absolute) = absolute {
            // Another host's root is not our home page
            Url::parse(&absolute)
                .ok()
                .filter(|url| {
                    url.host_str()
                        .is_some_and(|host| is_own_domain(host, &self.config.site_domain))
                })
                .map(|url| url.path().to_string())
        } else if Url::parse(stripped).is_ok() {
            None
        } else {
            resolve_path(source_url, stripped)
        };
        path.is_some_and(|path| path == self.config.root_url)
    }
}

/// Resolve a relative or root-relative href against a page URL.
///
/// A source without a trailing slash behaves like a file, so `related` on
/// `/blog/post` is `/blog/related`; on `/blog/` it is `/blog/related`.
pub fn resolve_path(source_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(RESOLUTION_BASE).ok()?.join(source_url).ok()?;
    let joined = base.join(href).ok()?;
    let path = joined.path();
    Some(
        urlencoding::decode(path)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| path.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment_and_query() {
        assert_eq!(strip_fragment_and_query("/a?x=1#top"), "/a");
        assert_eq!(strip_fragment_and_query("/a#top?x"), "/a");
        assert_eq!(strip_fragment_and_query("#top"), "");
        assert_eq!(strip_fragment_and_query("/plain"), "/plain");
    }

    #[test]
    fn test_candidate_keys_order() {
        assert_eq!(candidate_keys("/blog"), vec!["/blog", "/blog/"]);
        assert_eq!(candidate_keys("/blog/"), vec!["/blog/", "/blog//", "/blog"]);
        assert_eq!(candidate_keys("/"), vec!["/", "//"]);
    }

    #[test]
    fn test_resolve_path_file_semantics() {
        assert_eq!(resolve_path("/blog/post", "related").as_deref(), Some("/blog/related"));
        assert_eq!(resolve_path("/blog/", "related").as_deref(), Some("/blog/related"));
        assert_eq!(resolve_path("/about", "contact").as_deref(), Some("/contact"));
        assert_eq!(resolve_path("/blog/post", "../about").as_deref(), Some("/about"));
        assert_eq!(resolve_path("/", "../../x").as_deref(), Some("/x"));
    }

    #[test]
    fn test_resolve_path_decodes_percent_escapes() {
        assert_eq!(resolve_path("/blog/", "指南").as_deref(), Some("/blog/指南"));
        assert_eq!(resolve_path("/", "/a%20b").as_deref(), Some("/a b"));
    }

    #[test]
    fn test_is_own_domain() {
        assert!(is_own_domain("example.com", "example.com"));
        assert!(is_own_domain("www.example.com", "example.com"));
        assert!(is_own_domain("cdn.example.com", "www.example.com"));
        assert!(!is_own_domain("notexample.com", "example.com"));
        assert!(!is_own_domain("example.org", "example.com"));
    }
}
