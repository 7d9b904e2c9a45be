use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use siteaudit_core::config::{AuditConfig, DEFAULT_CONFIG_FILE};
use siteaudit_core::report::{ReportFormat, render_report, save_report};
use siteaudit_core::{AuditReport, run_audit};
use siteaudit_scanner::Loader;
use siteaudit_scanner::loader::ProgressCallback;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug};

/// Install the stderr log subscriber. Default WARN, `-v` DEBUG, `-vv` TRACE.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A subscriber may already be installed, e.g. in tests
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Config values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub domain: Option<String>,
    pub content_dir: Option<String>,
    pub depth_threshold: Option<usize>,
    pub workers: Option<usize>,
}

impl ConfigOverrides {
    pub fn from_args(args: &ArgMatches) -> Self {
        Self {
            domain: args.get_one::<String>("domain").cloned(),
            content_dir: args.get_one::<String>("content-dir").cloned(),
            depth_threshold: args.get_one::<usize>("depth-threshold").copied(),
            workers: args.get_one::<usize>("workers").copied(),
        }
    }

    pub fn apply(&self, config: &mut AuditConfig) {
        if let Some(ref domain) = self.domain {
            config.site_domain = domain.clone();
        }
        if let Some(ref dir) = self.content_dir {
            config.content_dirs = vec![dir.trim_matches('/').to_string()];
        }
        if let Some(depth) = self.depth_threshold {
            config.depth_threshold = depth;
        }
        if let Some(workers) = self.workers {
            config.workers = workers.max(1);
        }
    }
}

/// Load the config for a site.
///
/// An explicit path must exist. Otherwise `siteaudit.json` in the site root
/// is used when present, falling back to the defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<AuditConfig> {
    if let Some(path) = explicit {
        return AuditConfig::load(path)
            .with_context(|| format!("Could not load config {}", path.display()));
    }

    let candidate = root.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        debug!("Using config {}", candidate.display());
        return AuditConfig::load(&candidate)
            .with_context(|| format!("Could not load config {}", candidate.display()));
    }

    debug!("No config file found, using defaults");
    Ok(AuditConfig::default())
}

/// Load a site from disk and audit it.
pub async fn audit_site(
    root: &Path,
    config: &AuditConfig,
    progress: Option<ProgressCallback>,
) -> Result<AuditReport> {
    let mut loader = Loader::new(root)
        .with_content_dirs(config.content_dirs.clone())
        .with_excluded(config.excluded_files.clone())
        .with_workers(config.workers);
    if let Some(callback) = progress {
        loader = loader.with_progress_callback(callback);
    }

    let corpus = loader
        .load()
        .await
        .with_context(|| format!("Failed to load site at {}", root.display()))?;
    Ok(run_audit(&corpus, config))
}

/// Outcome of the audit command, used for the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOutcome {
    pub score: u32,
    pub fail_under: Option<u32>,
}

impl AuditOutcome {
    pub fn passed(&self) -> bool {
        self.fail_under.is_none_or(|threshold| self.score >= threshold)
    }
}

pub async fn handle_audit(args: &ArgMatches, quiet: bool) -> Result<AuditOutcome> {
    let root = args
        .get_one::<String>("ROOT")
        .map(|root| expand_path(root))
        .unwrap_or_else(|| PathBuf::from("."));
    let explicit_config = args
        .get_one::<PathBuf>("config")
        .map(|path| expand_path(&path.to_string_lossy()));
    let format_name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let Some(format) = ReportFormat::from_str(format_name) else {
        bail!("Unknown report format '{}'", format_name);
    };
    let output = args.get_one::<PathBuf>("output");
    let fail_under = args.get_one::<u32>("fail-under").copied();

    let mut config = load_config(&root, explicit_config.as_deref())?;
    ConfigOverrides::from_args(args).apply(&mut config);

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Loading pages from {}", root.display()));

    let progress_spinner = spinner.clone();
    let progress: ProgressCallback = Arc::new(move |count: usize, url: String| {
        progress_spinner.set_message(format!("Loaded {} pages: {}", count, url));
    });

    let report = audit_site(&root, &config, Some(progress)).await;
    spinner.finish_and_clear();
    let report = report?;

    let rendered = render_report(&report, format)?;
    match output {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", rendered),
    }

    if !quiet {
        let grade = format!("{}/100 ({})", report.score.score, report.score.grade);
        let grade = if report.score.score >= 80 {
            grade.green().bold()
        } else if report.score.score >= 60 {
            grade.yellow().bold()
        } else {
            grade.red().bold()
        };
        eprintln!(
            "{} {} pages, {} findings, score {}",
            "→".blue(),
            report.page_count,
            report.findings.len(),
            grade
        );
    }

    Ok(AuditOutcome {
        score: report.score.score,
        fail_under,
    })
}

/// Where `init` writes: a directory gets `siteaudit.json` appended.
pub fn init_target(path: &Path) -> PathBuf {
    if path.is_dir() || path.extension().is_none() {
        path.join(DEFAULT_CONFIG_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Write the default config, refusing to replace an existing file unless forced.
pub fn write_default_config(path: &Path, force: bool) -> Result<PathBuf> {
    let target = init_target(path);
    if target.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    AuditConfig::default()
        .save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

pub fn handle_init(args: &ArgMatches, quiet: bool) -> Result<()> {
    let path = args
        .get_one::<String>("PATH")
        .map(|path| expand_path(path))
        .unwrap_or_else(|| PathBuf::from("."));
    let force = args.get_flag("force");

    let target = write_default_config(&path, force)?;
    if !quiet {
        println!(
            "{} Configuration written to {}",
            "✓".green().bold(),
            target.display().to_string().bright_white()
        );
    }
    Ok(())
}
