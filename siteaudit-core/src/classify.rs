// Link hygiene checks for resolved links

use crate::config::AuditConfig;
use crate::finding::{DirtyReason, Finding};
use crate::resolve::{LinkKind, ResolvedLink, Resolver, strip_fragment_and_query};
use siteaudit_scanner::RawLink;
use tracing::debug;

pub const EXTERNAL_REQUIRED_REL: [&str; 3] = ["nofollow", "noopener", "noreferrer"];
pub const REDIRECT_REQUIRED_REL: [&str; 4] = ["nofollow", "sponsored", "noopener", "noreferrer"];

/// Outcome of classifying one authored link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub resolved: Option<ResolvedLink>,
    pub findings: Vec<Finding>,
}

fn starts_with_any(href: &str, prefixes: &[&str]) -> bool {
    let lower = href.to_ascii_lowercase();
    prefixes.iter().any(|prefix| lower.starts_with(prefix))
}

pub fn dirty_reason(href: &str) -> Option<DirtyReason> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if strip_fragment_and_query(href).ends_with(".html")
        && !starts_with_any(href, &["http", "#", "mailto", "//"])
    {
        Some(DirtyReason::HtmlSuffix)
    } else if href.contains("../") {
        Some(DirtyReason::ParentTraversal)
    } else if !href.starts_with('/')
        && !starts_with_any(href, &["http", "#", "mailto", "javascript:", "tel:"])
    {
        Some(DirtyReason::UnrootedRelative)
    } else {
        None
    }
}

pub fn check_dirty_link(page_url: &str, link: &RawLink) -> Option<Finding> {
    dirty_reason(&link.href).map(|reason| Finding::DirtyLink {
        page: page_url.to_string(),
        href: link.href.clone(),
        reason,
    })
}

fn missing_rel(link: &RawLink, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|token| !link.has_rel(token))
        .map(|token| token.to_string())
        .collect()
}

pub fn check_external_rel(resolved: &ResolvedLink, link: &RawLink) -> Option<Finding> {
    let LinkKind::External { domain } = &resolved.kind else {
        return None;
    };
    let missing = missing_rel(link, &EXTERNAL_REQUIRED_REL);
    if missing.is_empty() {
        return None;
    }
    Some(Finding::ExternalLink {
        source: resolved.source_url.clone(),
        domain: domain.clone(),
        rel: link.rel.clone(),
        missing,
    })
}

pub fn check_redirect_rel(
    resolved: &ResolvedLink,
    link: &RawLink,
    resolver: &Resolver<'_>,
) -> Option<Finding> {
    if resolved.kind != LinkKind::Redirect {
        return None;
    }
    let missing = missing_rel(link, &REDIRECT_REQUIRED_REL);
    if missing.is_empty() {
        return None;
    }
    let redirect_target = resolved.target_url.clone().unwrap_or_default();
    Some(Finding::RedirectUsage {
        source: resolved.source_url.clone(),
        destination: resolver.redirect_destination(&redirect_target).map(String::from),
        redirect_target,
        rel: link.rel.clone(),
        missing,
    })
}

pub fn check_broken(resolved: &ResolvedLink) -> Option<Finding> {
    if resolved.kind != LinkKind::Broken {
        return None;
    }
    Some(Finding::BrokenLink {
        source: resolved.source_url.clone(),
        target: resolved.target_url.clone().unwrap_or_default(),
    })
}

/// Whether a link is a purchase call-to-action.
pub fn is_sales_cta(link: &RawLink, config: &AuditConfig) -> bool {
    let has_marker = config
        .cta_marker_classes
        .iter()
        .any(|marker| link.css_classes.contains(marker));
    if has_marker {
        return true;
    }

    let is_filled_button = link.css_classes.iter().any(|class| {
        config
            .cta_button_class_prefixes
            .iter()
            .any(|prefix| class.starts_with(prefix.as_str()))
    });
    is_filled_button
        && config
            .cta_keywords
            .iter()
            .any(|keyword| link.anchor_text.contains(keyword.as_str()))
}

/// Sales CTAs on content pages must funnel to the home page.
pub fn check_pyramid(
    page_url: &str,
    link: &RawLink,
    resolver: &Resolver<'_>,
    config: &AuditConfig,
) -> Option<Finding> {
    let content_prefix = config.content_prefix()?;
    if !page_url.starts_with(&content_prefix) || !is_sales_cta(link, config) {
        return None;
    }
    if resolver.is_home_target(page_url, &link.href) {
        return None;
    }
    Some(Finding::PyramidViolation {
        source: page_url.to_string(),
        anchor_text: link.anchor_text.clone(),
        href: link.href.clone(),
    })
}

/// Resolve a link and run every check against it.
pub fn classify_link(
    page_url: &str,
    link: &RawLink,
    resolver: &Resolver<'_>,
    config: &AuditConfig,
) -> Classification {
    let mut findings = Vec::new();

    findings.extend(check_dirty_link(page_url, link));

    let resolved = resolver.resolve(page_url, &link.href);
    if let Some(ref resolved) = resolved {
        debug!(
            "{} -> {:?} ({:?})",
            link.href, resolved.target_url, resolved.kind
        );
        findings.extend(check_broken(resolved));
        findings.extend(check_external_rel(resolved, link));
        findings.extend(check_redirect_rel(resolved, link, resolver));
    }

    findings.extend(check_pyramid(page_url, link, resolver, config));

    Classification { resolved, findings }
}
