//! Title and meta-description checks across the corpus.

use crate::config::AuditConfig;
use crate::finding::Finding;
use siteaudit_scanner::Page;
use std::collections::HashMap;
use tracing::debug;

/// Groups of pages sharing an identical value, ordered by first appearance.
fn duplicate_groups<'a>(
    pages: &[&'a Page],
    value: impl Fn(&'a Page) -> Option<&'a str>,
) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for &page in pages {
        let Some(text) = value(page) else {
            continue;
        };
        match positions.get(text) {
            Some(&idx) => groups[idx].1.push(page.canonical_url.clone()),
            None => {
                positions.insert(text, groups.len());
                groups.push((text.to_string(), vec![page.canonical_url.clone()]));
            }
        }
    }

    groups.retain(|(_, urls)| urls.len() > 1);
    groups
}

/// Run the metadata checks over `pages` in their given order.
///
/// Per-page findings (missing title, missing description, short
/// description) come first, followed by duplicate-title and then
/// duplicate-description groups.
pub fn audit_metadata(pages: &[Page], config: &AuditConfig) -> Vec<Finding> {
    let included: Vec<&Page> = pages
        .iter()
        .filter(|page| {
            let exempt = config.is_metadata_exempt(&page.canonical_url);
            if exempt {
                debug!("Skipping metadata checks for {}", page.canonical_url);
            }
            !exempt
        })
        .collect();

    let mut findings = Vec::new();

    for page in &included {
        let url = &page.canonical_url;
        if page.title.is_none() {
            findings.push(Finding::MissingTitle { url: url.clone() });
        }
        match &page.description {
            None => findings.push(Finding::MissingDescription { url: url.clone() }),
            Some(description) => {
                let length = description.chars().count();
                if length < config.min_description_chars {
                    findings.push(Finding::ShortDescription {
                        url: url.clone(),
                        length,
                    });
                }
            }
        }
    }

    findings.extend(
        duplicate_groups(&included, |page| page.title.as_deref())
            .into_iter()
            .map(|(title, urls)| Finding::DuplicateTitle { title, urls }),
    );
    findings.extend(
        duplicate_groups(&included, |page| page.description.as_deref())
            .into_iter()
            .map(|(description, urls)| Finding::DuplicateDescription { description, urls }),
    );

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_groups_keep_page_order() {
        let pages = vec![
            Page::new("/c").with_title("X"),
            Page::new("/a").with_title("Y"),
            Page::new("/b").with_title("X"),
            Page::new("/d").with_title("Y"),
        ];
        let refs: Vec<&Page> = pages.iter().collect();
        let groups = duplicate_groups(&refs, |page| page.title.as_deref());
        assert_eq!(
            groups,
            vec![
                ("X".to_string(), vec!["/c".to_string(), "/b".to_string()]),
                ("Y".to_string(), vec!["/a".to_string(), "/d".to_string()]),
            ]
        );
    }

    #[test]
    fn test_short_description_counts_characters() {
        let config = AuditConfig {
            min_description_chars: 5,
            ..AuditConfig::default()
        };
        let pages = vec![
            Page::new("/")
                .with_title("Home")
                .with_description("这是一段描述"),
        ];
        assert!(audit_metadata(&pages, &config).is_empty());
    }
}
