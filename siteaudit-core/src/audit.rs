// Audit pipeline: classification, graph analysis, metadata, sitemap, scoring

use crate::classify::classify_link;
use crate::config::AuditConfig;
use crate::finding::{Finding, FindingKind};
use crate::graph::{DepthMap, LinkGraph, graph_findings};
use crate::metadata::audit_metadata;
use crate::resolve::{LinkKind, ResolvedLink, Resolver};
use crate::score::{Score, score_findings};
use crate::sitemap::check_sitemap;
use serde::Serialize;
use siteaudit_scanner::Corpus;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Outbound links to one external domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundDomain {
    pub domain: String,
    pub links: usize,
    /// Pages linking out to the domain
    pub sources: BTreeSet<String>,
}

/// Result of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub page_count: usize,
    pub link_count: usize,
    /// In discovery order
    pub findings: Vec<Finding>,
    pub graph: LinkGraph,
    pub depths: DepthMap,
    pub orphans: Vec<String>,
    /// Every external domain linked to, most links first
    pub outbound: Vec<OutboundDomain>,
    pub sitemap_checked: bool,
    pub score: Score,
}

impl AuditReport {
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind() == kind)
    }
}

/// Audit a loaded corpus. Reads nothing from disk.
pub fn run_audit(corpus: &Corpus, config: &AuditConfig) -> AuditReport {
    let known_pages: BTreeSet<String> = corpus
        .pages
        .iter()
        .map(|page| page.canonical_url.clone())
        .collect();
    info!(
        "Auditing {} pages ({} redirect rules)",
        known_pages.len(),
        corpus.redirects.len()
    );

    let resolver = Resolver::new(&known_pages, &corpus.redirects, config);
    let mut graph = LinkGraph::new(corpus.pages.iter().map(|page| page.canonical_url.as_str()));
    let mut findings = Vec::new();
    let mut link_count = 0;
    let mut outbound: BTreeMap<String, OutboundDomain> = BTreeMap::new();

    for page in &corpus.pages {
        for link in &page.links {
            link_count += 1;
            let classification = classify_link(&page.canonical_url, link, &resolver, config);
            if let Some(ResolvedLink {
                kind: LinkKind::Internal,
                target_url: Some(target),
                ..
            }) = &classification.resolved
            {
                graph.add_edge(&page.canonical_url, target);
            }
            if let Some(ResolvedLink {
                kind: LinkKind::External { domain },
                ..
            }) = &classification.resolved
            {
                let entry = outbound
                    .entry(domain.clone())
                    .or_insert_with(|| OutboundDomain {
                        domain: domain.clone(),
                        links: 0,
                        sources: BTreeSet::new(),
                    });
                entry.links += 1;
                entry.sources.insert(page.canonical_url.clone());
            }
            findings.extend(classification.findings);
        }
    }
    debug!(
        "Classified {} links into {} internal edges",
        link_count,
        graph.edge_count()
    );

    // Ties stay in domain order
    let mut outbound: Vec<OutboundDomain> = outbound.into_values().collect();
    outbound.sort_by(|a, b| b.links.cmp(&a.links));

    let root = config.root_url.as_str();
    let depths = graph.depths(root);
    let orphans = graph.orphans(root);
    findings.extend(graph_findings(&graph, &depths, root, config.depth_threshold));

    findings.extend(audit_metadata(&corpus.pages, config));

    let sitemap_checked = match &corpus.sitemap {
        Some(sitemap) => {
            findings.extend(check_sitemap(&corpus.pages, &known_pages, sitemap, config));
            true
        }
        None => {
            debug!("No sitemap loaded, skipping sitemap cross-check");
            false
        }
    };

    let score = score_findings(&findings, &config.weights);
    info!(
        "Audit complete: {} findings, score {} ({})",
        findings.len(),
        score.score,
        score.grade
    );

    AuditReport {
        page_count: corpus.pages.len(),
        link_count,
        findings,
        graph,
        depths,
        orphans,
        outbound,
        sitemap_checked,
        score,
    }
}
