//! Audit configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "siteaudit.json";

/// Points deducted per finding occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub broken_link: u32,
    pub missing_title: u32,
    /// Per excess page in a duplicate group
    pub duplicate_title: u32,
    pub missing_description: u32,
    pub pyramid_violation: u32,
    /// Per excess page in a duplicate group
    pub duplicate_description: u32,
    pub redirect_usage: u32,
    pub orphan_page: u32,
    pub sitemap_entry_missing: u32,
    pub external_link: u32,
    pub unreachable_page: u32,
    pub deep_page: u32,
    pub not_in_sitemap: u32,
    pub dirty_link: u32,
    pub short_description: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            broken_link: 5,
            missing_title: 5,
            duplicate_title: 4,
            missing_description: 3,
            pyramid_violation: 3,
            duplicate_description: 2,
            redirect_usage: 2,
            orphan_page: 2,
            sitemap_entry_missing: 2,
            external_link: 1,
            unreachable_page: 1,
            deep_page: 1,
            not_in_sitemap: 1,
            dirty_link: 1,
            short_description: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// The site's own domain; absolute links to it are not external
    pub site_domain: String,
    pub root_url: String,
    /// Directories scanned next to the root; the first one is the content
    /// directory the CTA policy applies to
    pub content_dirs: Vec<String>,
    pub excluded_files: Vec<String>,
    pub resource_extensions: Vec<String>,
    pub redirect_prefixes: Vec<String>,
    pub metadata_exempt: Vec<String>,
    pub verification_prefixes: Vec<String>,
    pub sitemap_exempt: Vec<String>,
    pub cta_marker_classes: Vec<String>,
    pub cta_button_class_prefixes: Vec<String>,
    pub cta_keywords: Vec<String>,
    pub depth_threshold: usize,
    pub min_description_chars: usize,
    pub workers: usize,
    pub weights: ScoringWeights,
}

fn is_verification_token(token: &str) -> bool {
    let well_formed = token.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    well_formed
        && token.split(['-', '_']).any(|segment| {
            segment.len() >= 6 && segment.chars().any(|c| c.is_ascii_digit())
        })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            site_domain: "example.com".to_string(),
            root_url: "/".to_string(),
            content_dirs: strings(&["blog"]),
            excluded_files: strings(&["layout_template"]),
            resource_extensions: strings(&[
                ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".ico", ".css", ".js", ".xml",
                ".woff", ".woff2", ".ttf", ".eot",
            ]),
            redirect_prefixes: strings(&["/go/"]),
            metadata_exempt: strings(&["/404", "/sitemap", "/legal"]),
            verification_prefixes: strings(&["/google", "/baidu_verify_", "/BingSiteAuth", "/yandex_"]),
            sitemap_exempt: strings(&["/404"]),
            cta_marker_classes: strings(&["sales-btn", "cta-sales"]),
            cta_button_class_prefixes: strings(&["bg-purple-", "bg-blue-", "bg-gradient-to-"]),
            cta_keywords: strings(&[
                "立即开通",
                "立即购买",
                "立即上车",
                "查看方案",
                "获取API",
                "立即升级",
                "查看价格",
                "立即获取",
            ]),
            depth_threshold: 3,
            min_description_chars: 100,
            workers: 8,
            weights: ScoringWeights::default(),
        }
    }
}

impl AuditConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AuditError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| AuditError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = self.to_json()?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    /// URL prefix of the content directory, e.g. `/blog/`.
    pub fn content_prefix(&self) -> Option<String> {
        self.content_dirs
            .first()
            .map(|dir| format!("/{}/", dir.trim_matches('/')))
    }

    pub fn is_metadata_exempt(&self, url: &str) -> bool {
        self.metadata_exempt.iter().any(|u| u == url) || self.is_verification_page(url)
    }

    /// Search-engine ownership files such as `/google0123abcd`.
    ///
    /// The token after the prefix must carry a code-like segment (six or
    /// more characters with a digit), so `/googleplay` is an ordinary page.
    pub fn is_verification_page(&self, url: &str) -> bool {
        self.verification_prefixes.iter().any(|prefix| {
            url.strip_prefix(prefix.as_str())
                .is_some_and(is_verification_token)
        })
    }

    pub fn is_resource(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        self.resource_extensions
            .iter()
            .any(|ext| lower.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AuditConfig::from_json(r#"{"site_domain": "gemini.example", "depth_threshold": 5}"#)
            .unwrap();
        assert_eq!(config.site_domain, "gemini.example");
        assert_eq!(config.depth_threshold, 5);
        assert_eq!(config.content_dirs, vec!["blog".to_string()]);
        assert_eq!(config.weights.broken_link, 5);
    }

    #[test]
    fn test_json_round_trip() {
        let config = AuditConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(AuditConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_content_prefix() {
        let config = AuditConfig::default();
        assert_eq!(config.content_prefix().as_deref(), Some("/blog/"));
    }

    #[test]
    fn test_metadata_exemptions() {
        let config = AuditConfig::default();
        assert!(config.is_metadata_exempt("/404"));
        assert!(config.is_metadata_exempt("/google1234abcd"));
        assert!(config.is_metadata_exempt("/baidu_verify_codeva-7sdOTOJZ5I"));
        assert!(!config.is_metadata_exempt("/google-gemini-guide"));
        assert!(!config.is_metadata_exempt("/google"));
        assert!(!config.is_metadata_exempt("/googleplay"));
        assert!(!config.is_metadata_exempt("/googleanalytics"));
        assert!(!config.is_metadata_exempt("/google2024-roundup"));
        assert!(!config.is_metadata_exempt("/about"));
    }

    #[test]
    fn test_resource_extensions_are_case_insensitive() {
        let config = AuditConfig::default();
        assert!(config.is_resource("/images/Logo.PNG"));
        assert!(config.is_resource("/sitemap.xml"));
        assert!(!config.is_resource("/blog/post"));
    }
}
