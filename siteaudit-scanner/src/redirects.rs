use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const REDIRECTS_FILE: &str = "_redirects";

/// Redirect rules keyed by source path.
///
/// Sources drive link classification; destinations are shown in redirect
/// findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTable {
    rules: BTreeMap<String, Option<String>>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `_redirects` file: `source destination [status]` per line.
    pub fn parse(content: &str) -> Self {
        let mut table = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(source) = parts.next() else {
                continue;
            };
            if !source.starts_with('/') {
                debug!("Ignoring redirect rule with non-path source '{}'", source);
                continue;
            }
            table.insert(source, parts.next());
        }
        table
    }

    pub fn insert(&mut self, source: &str, destination: Option<&str>) {
        self.rules
            .insert(source.to_string(), destination.map(String::from));
    }

    pub fn contains(&self, source: &str) -> bool {
        self.rules.contains_key(source)
    }

    pub fn destination(&self, source: &str) -> Option<&str> {
        self.rules.get(source).and_then(|d| d.as_deref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for RedirectTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = Self::new();
        for source in iter {
            table.insert(source, None);
        }
        table
    }
}

/// Load `_redirects` from the site root. Missing file yields an empty table.
pub async fn load_redirects(root: &Path) -> RedirectTable {
    let path = root.join(REDIRECTS_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            let table = RedirectTable::parse(&content);
            debug!("Loaded {} redirect rules from {}", table.len(), path.display());
            table
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RedirectTable::new(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            RedirectTable::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redirect_rules() {
        let table = RedirectTable::parse(
            "# affiliate links\n\
             /go/pro   https://shop.example.net/pro   302\n\
             \n\
             /go/api https://api.example.net\n\
             https://old.example.com/* /:splat 301\n",
        );
        assert_eq!(table.len(), 2);
        assert!(table.contains("/go/pro"));
        assert_eq!(table.destination("/go/api"), Some("https://api.example.net"));
        assert!(!table.contains("https://old.example.com/*"));
    }
}
