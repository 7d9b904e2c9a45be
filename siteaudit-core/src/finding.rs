use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Why a link was flagged as dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtyReason {
    HtmlSuffix,
    ParentTraversal,
    UnrootedRelative,
}

impl DirtyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirtyReason::HtmlSuffix => "contains .html",
            DirtyReason::ParentTraversal => "contains ../",
            DirtyReason::UnrootedRelative => "risky relative path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DirtyLink,
    BrokenLink,
    ExternalLink,
    RedirectUsage,
    PyramidViolation,
    DuplicateTitle,
    DuplicateDescription,
    MissingTitle,
    MissingDescription,
    ShortDescription,
    OrphanPage,
    UnreachablePage,
    DeepPage,
    NotInSitemap,
    SitemapEntryMissing,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::DirtyLink => "dirty_link",
            FindingKind::BrokenLink => "broken_link",
            FindingKind::ExternalLink => "external_link",
            FindingKind::RedirectUsage => "redirect_usage",
            FindingKind::PyramidViolation => "pyramid_violation",
            FindingKind::DuplicateTitle => "duplicate_title",
            FindingKind::DuplicateDescription => "duplicate_description",
            FindingKind::MissingTitle => "missing_title",
            FindingKind::MissingDescription => "missing_description",
            FindingKind::ShortDescription => "short_description",
            FindingKind::OrphanPage => "orphan_page",
            FindingKind::UnreachablePage => "unreachable_page",
            FindingKind::DeepPage => "deep_page",
            FindingKind::NotInSitemap => "not_in_sitemap",
            FindingKind::SitemapEntryMissing => "sitemap_entry_missing",
        }
    }

    /// Section heading used by the renderers.
    pub fn title(&self) -> &'static str {
        match self {
            FindingKind::DirtyLink => "Dirty Links",
            FindingKind::BrokenLink => "Broken Links",
            FindingKind::ExternalLink => "External Links Missing rel Attributes",
            FindingKind::RedirectUsage => "Redirect Links Missing rel Attributes",
            FindingKind::PyramidViolation => "CTA Pyramid Violations",
            FindingKind::DuplicateTitle => "Duplicate Titles",
            FindingKind::DuplicateDescription => "Duplicate Descriptions",
            FindingKind::MissingTitle => "Missing Titles",
            FindingKind::MissingDescription => "Missing Descriptions",
            FindingKind::ShortDescription => "Short Descriptions",
            FindingKind::OrphanPage => "Orphan Pages",
            FindingKind::UnreachablePage => "Unreachable Pages",
            FindingKind::DeepPage => "Deep Pages",
            FindingKind::NotInSitemap => "Pages Not In Sitemap",
            FindingKind::SitemapEntryMissing => "Sitemap Entries Without Pages",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::BrokenLink
            | FindingKind::MissingTitle
            | FindingKind::DuplicateTitle
            | FindingKind::SitemapEntryMissing => Severity::High,
            FindingKind::MissingDescription
            | FindingKind::DuplicateDescription
            | FindingKind::PyramidViolation
            | FindingKind::RedirectUsage
            | FindingKind::OrphanPage => Severity::Medium,
            FindingKind::DirtyLink
            | FindingKind::ExternalLink
            | FindingKind::ShortDescription
            | FindingKind::UnreachablePage
            | FindingKind::DeepPage
            | FindingKind::NotInSitemap => Severity::Low,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    DirtyLink {
        page: String,
        href: String,
        reason: DirtyReason,
    },
    BrokenLink {
        source: String,
        target: String,
    },
    ExternalLink {
        source: String,
        domain: String,
        rel: BTreeSet<String>,
        missing: Vec<String>,
    },
    RedirectUsage {
        source: String,
        redirect_target: String,
        /// Where the `_redirects` rule sends the visitor, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<String>,
        rel: BTreeSet<String>,
        missing: Vec<String>,
    },
    PyramidViolation {
        source: String,
        anchor_text: String,
        href: String,
    },
    DuplicateTitle {
        title: String,
        urls: Vec<String>,
    },
    DuplicateDescription {
        description: String,
        urls: Vec<String>,
    },
    MissingTitle {
        url: String,
    },
    MissingDescription {
        url: String,
    },
    ShortDescription {
        url: String,
        length: usize,
    },
    OrphanPage {
        url: String,
    },
    UnreachablePage {
        url: String,
    },
    DeepPage {
        url: String,
        depth: usize,
    },
    NotInSitemap {
        url: String,
    },
    SitemapEntryMissing {
        url: String,
    },
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::DirtyLink { .. } => FindingKind::DirtyLink,
            Finding::BrokenLink { .. } => FindingKind::BrokenLink,
            Finding::ExternalLink { .. } => FindingKind::ExternalLink,
            Finding::RedirectUsage { .. } => FindingKind::RedirectUsage,
            Finding::PyramidViolation { .. } => FindingKind::PyramidViolation,
            Finding::DuplicateTitle { .. } => FindingKind::DuplicateTitle,
            Finding::DuplicateDescription { .. } => FindingKind::DuplicateDescription,
            Finding::MissingTitle { .. } => FindingKind::MissingTitle,
            Finding::MissingDescription { .. } => FindingKind::MissingDescription,
            Finding::ShortDescription { .. } => FindingKind::ShortDescription,
            Finding::OrphanPage { .. } => FindingKind::OrphanPage,
            Finding::UnreachablePage { .. } => FindingKind::UnreachablePage,
            Finding::DeepPage { .. } => FindingKind::DeepPage,
            Finding::NotInSitemap { .. } => FindingKind::NotInSitemap,
            Finding::SitemapEntryMissing { .. } => FindingKind::SitemapEntryMissing,
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind().severity()
    }

    /// How many scoring units this finding counts for.
    ///
    /// Duplicate groups count their excess pages, everything else counts once.
    pub fn occurrences(&self) -> u32 {
        match self {
            Finding::DuplicateTitle { urls, .. } | Finding::DuplicateDescription { urls, .. } => {
                urls.len().saturating_sub(1) as u32
            }
            _ => 1,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Finding::DirtyLink { page, href, reason } => {
                format!("In {}: href=\"{}\" ({})", page, href, reason.as_str())
            }
            Finding::BrokenLink { source, target } => format!("In {} -> {}", source, target),
            Finding::ExternalLink {
                source,
                domain,
                missing,
                ..
            } => format!(
                "In {}: link to {} is missing rel=\"{}\"",
                source,
                domain,
                missing.join(" ")
            ),
            Finding::RedirectUsage {
                source,
                redirect_target,
                destination,
                missing,
                ..
            } => {
                let target = match destination {
                    Some(destination) => format!("{} (-> {})", redirect_target, destination),
                    None => redirect_target.clone(),
                };
                format!(
                    "In {}: redirect {} is missing rel=\"{}\"",
                    source,
                    target,
                    missing.join(" ")
                )
            }
            Finding::PyramidViolation {
                source,
                anchor_text,
                href,
            } => format!(
                "In {}: CTA '{}' points to {} instead of the home page",
                source, anchor_text, href
            ),
            Finding::DuplicateTitle { title, urls } => {
                format!("\"{}\" used by {} pages: {}", title, urls.len(), urls.join(", "))
            }
            Finding::DuplicateDescription { description, urls } => format!(
                "\"{}\" used by {} pages: {}",
                description,
                urls.len(),
                urls.join(", ")
            ),
            Finding::MissingTitle { url } => format!("{} has no <title>", url),
            Finding::MissingDescription { url } => {
                format!("{} has no meta description", url)
            }
            Finding::ShortDescription { url, length } => {
                format!("{} description is {} characters", url, length)
            }
            Finding::OrphanPage { url } => format!("{} has no inbound links", url),
            Finding::UnreachablePage { url } => format!("{} is unreachable from home", url),
            Finding::DeepPage { url, depth } => format!("{} (depth: {})", url, depth),
            Finding::NotInSitemap { url } => format!("{} is not listed in the sitemap", url),
            Finding::SitemapEntryMissing { url } => {
                format!("{} is in the sitemap but has no page", url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_groups_count_excess_pages() {
        let finding = Finding::DuplicateTitle {
            title: "X".to_string(),
            urls: vec!["/a".to_string(), "/b".to_string(), "/c".to_string()],
        };
        assert_eq!(finding.occurrences(), 2);
        assert_eq!(finding.kind(), FindingKind::DuplicateTitle);
    }

    #[test]
    fn test_finding_serializes_with_kind_tag() {
        let finding = Finding::BrokenLink {
            source: "/".to_string(),
            target: "/missing".to_string(),
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "broken_link");
        assert_eq!(json["target"], "/missing");
    }
}
