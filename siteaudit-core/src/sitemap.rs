// Cross-check between scanned pages and sitemap.xml entries

use crate::config::AuditConfig;
use crate::finding::Finding;
use crate::resolve::match_known;
use siteaudit_scanner::Page;
use std::collections::BTreeSet;

pub fn check_sitemap(
    pages: &[Page],
    known_pages: &BTreeSet<String>,
    sitemap: &BTreeSet<String>,
    config: &AuditConfig,
) -> Vec<Finding> {
    let mut findings: Vec<Finding> = pages
        .iter()
        .map(|page| &page.canonical_url)
        .filter(|url| !config.sitemap_exempt.contains(url))
        .filter(|url| match_known(url, sitemap).is_none())
        .map(|url| Finding::NotInSitemap { url: url.clone() })
        .collect();

    findings.extend(
        sitemap
            .iter()
            .filter(|entry| match_known(entry, known_pages).is_none())
            .map(|entry| Finding::SitemapEntryMissing { url: entry.clone() }),
    );

    findings
}
