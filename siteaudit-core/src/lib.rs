pub mod audit;
pub mod classify;
pub mod config;
pub mod error;
pub mod finding;
pub mod graph;
pub mod metadata;
pub mod report;
pub mod resolve;
pub mod score;
pub mod sitemap;

use colored::Colorize;

pub use audit::{AuditReport, OutboundDomain, run_audit};
pub use config::{AuditConfig, ScoringWeights};
pub use error::AuditError;
pub use finding::{Finding, FindingKind, Severity};
pub use graph::{Depth, DepthMap, LinkGraph};
pub use score::{Grade, Score};

pub fn print_banner() {
    let banner = r#"
      _ _                       _ _ _
  ___(_) |_ ___  __ _ _   _  __| (_) |_
 / __| | __/ _ \/ _` | | | |/ _` | | __|
 \__ \ | ||  __/ (_| | |_| | (_| | | |_
 |___/_|\__\___|\__,_|\__,_|\__,_|_|\__|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "static site link graph & SEO auditor".bright_black(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
