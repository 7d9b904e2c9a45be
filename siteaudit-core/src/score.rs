//! Site health score derived from findings.

use crate::config::ScoringWeights;
use crate::finding::{Finding, FindingKind};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub kind: FindingKind,
    pub count: u32,
    pub points: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub score: u32,
    pub grade: Grade,
    pub deductions: Vec<Deduction>,
}

impl ScoringWeights {
    pub fn weight(&self, kind: FindingKind) -> u32 {
        match kind {
            FindingKind::BrokenLink => self.broken_link,
            FindingKind::MissingTitle => self.missing_title,
            FindingKind::DuplicateTitle => self.duplicate_title,
            FindingKind::MissingDescription => self.missing_description,
            FindingKind::PyramidViolation => self.pyramid_violation,
            FindingKind::DuplicateDescription => self.duplicate_description,
            FindingKind::RedirectUsage => self.redirect_usage,
            FindingKind::OrphanPage => self.orphan_page,
            FindingKind::SitemapEntryMissing => self.sitemap_entry_missing,
            FindingKind::ExternalLink => self.external_link,
            FindingKind::UnreachablePage => self.unreachable_page,
            FindingKind::DeepPage => self.deep_page,
            FindingKind::NotInSitemap => self.not_in_sitemap,
            FindingKind::DirtyLink => self.dirty_link,
            FindingKind::ShortDescription => self.short_description,
        }
    }
}

fn reason(kind: FindingKind, count: u32) -> String {
    let noun = match kind {
        FindingKind::DirtyLink => "dirty link",
        FindingKind::BrokenLink => "broken link",
        FindingKind::ExternalLink => "external link missing rel",
        FindingKind::RedirectUsage => "redirect link missing rel",
        FindingKind::PyramidViolation => "CTA pyramid violation",
        FindingKind::DuplicateTitle => "duplicate title",
        FindingKind::DuplicateDescription => "duplicate description",
        FindingKind::MissingTitle => "missing title",
        FindingKind::MissingDescription => "missing description",
        FindingKind::ShortDescription => "short description",
        FindingKind::OrphanPage => "orphan page",
        FindingKind::UnreachablePage => "unreachable page",
        FindingKind::DeepPage => "deep page",
        FindingKind::NotInSitemap => "page not in sitemap",
        FindingKind::SitemapEntryMissing => "sitemap entry without page",
    };
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "(s)" })
}

/// Score a set of findings.
///
/// The total does not depend on finding order; deductions are listed once
/// per kind in order of that kind's first finding.
pub fn score_findings(findings: &[Finding], weights: &ScoringWeights) -> Score {
    let mut tallies: Vec<(FindingKind, u32)> = Vec::new();
    for finding in findings {
        let kind = finding.kind();
        let occurrences = finding.occurrences();
        match tallies.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => *count += occurrences,
            None => tallies.push((kind, occurrences)),
        }
    }

    let deductions: Vec<Deduction> = tallies
        .into_iter()
        .map(|(kind, count)| Deduction {
            kind,
            count,
            points: count.saturating_mul(weights.weight(kind)),
            reason: reason(kind, count),
        })
        .filter(|deduction| deduction.points > 0)
        .collect();

    let total: u32 = deductions
        .iter()
        .fold(0u32, |acc, d| acc.saturating_add(d.points));
    let score = MAX_SCORE.saturating_sub(total);

    Score {
        score,
        grade: Grade::from_score(score),
        deductions,
    }
}
