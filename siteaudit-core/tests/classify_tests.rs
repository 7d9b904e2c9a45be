// Tests for per-link hygiene checks

use siteaudit_core::classify::{classify_link, dirty_reason, is_sales_cta};
use siteaudit_core::config::AuditConfig;
use siteaudit_core::finding::{DirtyReason, Finding, FindingKind};
use siteaudit_core::resolve::{LinkKind, Resolver};
use siteaudit_scanner::{RawLink, RedirectTable};
use std::collections::BTreeSet;

fn known_pages() -> BTreeSet<String> {
    ["/", "/about", "/pricing", "/blog/", "/blog/post", "/blog/related"]
        .iter()
        .map(|u| u.to_string())
        .collect()
}

fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
    findings.iter().map(Finding::kind).collect()
}

// ============================================================================
// Dirty Link Tests
// ============================================================================

#[test]
fn test_html_suffix_is_dirty() {
    assert_eq!(dirty_reason("old-page.html"), Some(DirtyReason::HtmlSuffix));
    assert_eq!(dirty_reason("/about.html#team"), Some(DirtyReason::HtmlSuffix));
}

#[test]
fn test_parent_traversal_is_dirty() {
    assert_eq!(dirty_reason("../about"), Some(DirtyReason::ParentTraversal));
    assert_eq!(dirty_reason("/blog/../about"), Some(DirtyReason::ParentTraversal));
}

#[test]
fn test_unrooted_relative_is_dirty() {
    assert_eq!(dirty_reason("related"), Some(DirtyReason::UnrootedRelative));
    assert_eq!(dirty_reason("./related"), Some(DirtyReason::UnrootedRelative));
}

#[test]
fn test_first_matching_reason_wins() {
    assert_eq!(dirty_reason("../old.html"), Some(DirtyReason::HtmlSuffix));
}

#[test]
fn test_clean_hrefs() {
    for href in [
        "",
        "/",
        "/about",
        "#pricing",
        "https://other.example/page.html",
        "//cdn.example/x.html",
        "mailto:hi@example.com",
        "tel:+1234",
        "javascript:void(0)",
    ] {
        assert_eq!(dirty_reason(href), None, "{}", href);
    }
}

#[test]
fn test_dirty_link_reported_regardless_of_resolution() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("old-page.html");
    let result = classify_link("/about", &link, &resolver, &config);

    assert_eq!(
        kinds(&result.findings),
        vec![FindingKind::DirtyLink, FindingKind::BrokenLink]
    );
    assert_eq!(
        result.findings[0],
        Finding::DirtyLink {
            page: "/about".to_string(),
            href: "old-page.html".to_string(),
            reason: DirtyReason::HtmlSuffix,
        }
    );
}

#[test]
fn test_dirty_link_that_still_resolves() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("related");
    let result = classify_link("/blog/post", &link, &resolver, &config);

    assert_eq!(kinds(&result.findings), vec![FindingKind::DirtyLink]);
    let resolved = result.resolved.unwrap();
    assert_eq!(resolved.kind, LinkKind::Internal);
    assert_eq!(resolved.target_url.as_deref(), Some("/blog/related"));
}

// ============================================================================
// rel Policy Tests
// ============================================================================

#[test]
fn test_external_link_missing_rel() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("https://github.com/x").with_rel("noopener");
    let result = classify_link("/", &link, &resolver, &config);

    match result.findings.as_slice() {
        [Finding::ExternalLink { domain, missing, .. }] => {
            assert_eq!(domain, "github.com");
            assert_eq!(missing, &vec!["nofollow".to_string(), "noreferrer".to_string()]);
        }
        other => panic!("unexpected findings: {:?}", other),
    }
}

#[test]
fn test_external_link_with_full_rel_is_clean() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("https://github.com/x").with_rel("NOFOLLOW noopener noreferrer");
    let result = classify_link("/", &link, &resolver, &config);

    assert!(result.findings.is_empty());
}

#[test]
fn test_redirect_link_with_empty_rel() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("/go/offer").with_rel("");
    let result = classify_link("/", &link, &resolver, &config);

    match result.findings.as_slice() {
        [Finding::RedirectUsage { redirect_target, destination, missing, .. }] => {
            assert_eq!(redirect_target, "/go/offer");
            assert_eq!(destination, &None);
            assert_eq!(
                missing,
                &vec![
                    "nofollow".to_string(),
                    "sponsored".to_string(),
                    "noopener".to_string(),
                    "noreferrer".to_string(),
                ]
            );
        }
        other => panic!("unexpected findings: {:?}", other),
    }
}

#[test]
fn test_redirect_link_needs_sponsored() {
    let pages = known_pages();
    let redirects = RedirectTable::parse("/deal https://partner.example/\n");
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("/deal").with_rel("nofollow noopener noreferrer");
    let result = classify_link("/", &link, &resolver, &config);

    match result.findings.as_slice() {
        [finding @ Finding::RedirectUsage { missing, destination, .. }] => {
            assert_eq!(missing, &vec!["sponsored".to_string()]);
            assert_eq!(destination.as_deref(), Some("https://partner.example/"));
            assert!(finding.message().contains("/deal (-> https://partner.example/)"));
        }
        other => panic!("unexpected findings: {:?}", other),
    }
}

// ============================================================================
// CTA Pyramid Tests
// ============================================================================

#[test]
fn test_sales_marker_class_is_cta() {
    let config = AuditConfig::default();
    let link = RawLink::new("/pricing").with_classes("btn sales-btn");
    assert!(is_sales_cta(&link, &config));
}

#[test]
fn test_filled_button_needs_purchase_keyword() {
    let config = AuditConfig::default();

    let cta = RawLink::new("/pricing")
        .with_classes("px-4 bg-purple-600 text-white")
        .with_text("立即购买 Pro");
    assert!(is_sales_cta(&cta, &config));

    let plain = RawLink::new("/pricing")
        .with_classes("px-4 bg-purple-600 text-white")
        .with_text("Read more");
    assert!(!is_sales_cta(&plain, &config));

    let keyword_only = RawLink::new("/pricing").with_text("立即购买");
    assert!(!is_sales_cta(&keyword_only, &config));
}

#[test]
fn test_cta_on_blog_must_point_home() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let bad = RawLink::new("/pricing").with_classes("sales-btn").with_text("立即开通");
    let result = classify_link("/blog/post", &bad, &resolver, &config);
    assert_eq!(kinds(&result.findings), vec![FindingKind::PyramidViolation]);

    for href in ["/", "/#pricing", "https://example.com/#pricing"] {
        let good = RawLink::new(href).with_classes("sales-btn");
        let result = classify_link("/blog/post", &good, &resolver, &config);
        assert!(result.findings.is_empty(), "{}: {:?}", href, result.findings);
    }
}

#[test]
fn test_cta_to_foreign_domain_root_is_a_violation() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    for href in ["https://affiliate-shop.net/?ref=blog", "//affiliate-shop.net/"] {
        let link = RawLink::new(href)
            .with_rel("nofollow noopener noreferrer")
            .with_classes("sales-btn")
            .with_text("Buy now");
        let result = classify_link("/blog/post", &link, &resolver, &config);
        assert_eq!(
            kinds(&result.findings),
            vec![FindingKind::PyramidViolation],
            "{}",
            href
        );
    }
}

#[test]
fn test_cta_outside_blog_is_not_checked() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("/pricing").with_classes("sales-btn");
    let result = classify_link("/about", &link, &resolver, &config);
    assert!(result.findings.is_empty());
}

#[test]
fn test_checks_fire_together() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let link = RawLink::new("../go/trial.html").with_classes("cta-sales");
    let result = classify_link("/blog/post", &link, &resolver, &config);

    assert_eq!(
        kinds(&result.findings),
        vec![
            FindingKind::DirtyLink,
            FindingKind::RedirectUsage,
            FindingKind::PyramidViolation,
        ]
    );
}

#[test]
fn test_anchor_only_link_has_no_resolution() {
    let pages = known_pages();
    let redirects = RedirectTable::new();
    let config = AuditConfig::default();
    let resolver = Resolver::new(&pages, &redirects, &config);

    let result = classify_link("/about", &RawLink::new("#team"), &resolver, &config);
    assert!(result.resolved.is_none());
    assert!(result.findings.is_empty());
}
