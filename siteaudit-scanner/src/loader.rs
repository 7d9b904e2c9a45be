use crate::error::{Result, ScanError};
use crate::page::Page;
use crate::parser::parse_page;
use crate::redirects::{RedirectTable, load_redirects};
use crate::sitemap::load_sitemap;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Everything the audit engine reads from disk.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub pages: Vec<Page>,
    pub sitemap: Option<BTreeSet<String>>,
    pub redirects: RedirectTable,
}

/// Scans a static site directory for HTML pages.
pub struct Loader {
    root: PathBuf,
    content_dirs: Vec<String>,
    excluded: Vec<String>,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Loader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            content_dirs: vec!["blog".to_string()],
            excluded: vec!["layout_template".to_string()],
            workers: 8,
            progress_callback: None,
        }
    }

    pub fn with_content_dirs(mut self, dirs: Vec<String>) -> Self {
        self.content_dirs = dirs;
        self
    }

    /// File names containing any of these patterns are skipped.
    pub fn with_excluded(mut self, patterns: Vec<String>) -> Self {
        self.excluded = patterns;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Load pages, the sitemap and the redirect table.
    pub async fn load(&self) -> Result<Corpus> {
        let pages = self.load_pages().await?;
        let sitemap = load_sitemap(&self.root).await;
        let redirects = load_redirects(&self.root).await;

        Ok(Corpus {
            pages,
            sitemap,
            redirects,
        })
    }

    /// Load every HTML page, in sorted source-path order.
    pub async fn load_pages(&self) -> Result<Vec<Page>> {
        let files = self.discover().await?;
        info!(
            "Found {} HTML files under {} ({} workers)",
            files.len(),
            self.root.display(),
            self.workers
        );

        let loaded = Arc::new(AtomicUsize::new(0));
        let pages: Vec<Page> = stream::iter(files)
            .map(|path| {
                let root = self.root.clone();
                let loaded = loaded.clone();
                let progress_cb = self.progress_callback.clone();
                async move {
                    let page = Self::load_page(&root, path).await?;
                    let count = loaded.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = progress_cb {
                        callback(count, page.canonical_url.clone());
                    }
                    Some(page)
                }
            })
            // `buffered` keeps input order, so page order never depends on scheduling
            .buffered(self.workers)
            .filter_map(|page| async move { page })
            .collect()
            .await;

        info!("Loaded {} pages", pages.len());
        Ok(pages)
    }

    async fn load_page(root: &Path, path: PathBuf) -> Option<Page> {
        let Some(url) = canonical_url(root, &path) else {
            warn!("Cannot derive a URL for {}, skipping", path.display());
            return None;
        };

        let html = match tokio::fs::read_to_string(&path).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        let shown = path.display().to_string();
        match tokio::task::spawn_blocking(move || parse_page(url, path, &html)).await {
            Ok(page) => {
                debug!("Parsed {} ({} links)", page.canonical_url, page.links.len());
                Some(page)
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", shown, e);
                None
            }
        }
    }

    /// List the HTML files to scan: the root plus each content directory.
    async fn discover(&self) -> Result<Vec<PathBuf>> {
        if !tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(ScanError::RootNotFound(self.root.clone()));
        }

        let mut files = self.html_files_in(&self.root).await?;
        for dir in &self.content_dirs {
            let path = self.root.join(dir);
            if !tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false)
            {
                debug!("Content directory {} not found, skipping", path.display());
                continue;
            }
            files.extend(self.html_files_in(&path).await?);
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    async fn html_files_in(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Cannot stat {}, skipping: {}", path.display(), e);
                    continue;
                }
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".html") {
                continue;
            }
            if self.excluded.iter().any(|pattern| name.contains(pattern.as_str())) {
                debug!("Excluding template {}", path.display());
                continue;
            }
            files.push(path);
        }
        Ok(files)
    }
}

/// Derive the canonical URL of an HTML file relative to the site root.
///
/// `index.html` -> `/`, `d/index.html` -> `/d/`, `p/name.html` -> `/p/name`.
pub fn canonical_url(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;

    let last = parts.pop()?;
    let stem = last.strip_suffix(".html")?;
    if stem == "index" {
        if parts.is_empty() {
            Some("/".to_string())
        } else {
            Some(format!("/{}/", parts.join("/")))
        }
    } else {
        parts.push(stem);
        Some(format!("/{}", parts.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_url_root_index() {
        let root = Path::new("/site");
        assert_eq!(
            canonical_url(root, Path::new("/site/index.html")),
            Some("/".to_string())
        );
    }

    #[test]
    fn test_canonical_url_directory_index_keeps_slash() {
        let root = Path::new("/site");
        assert_eq!(
            canonical_url(root, Path::new("/site/blog/index.html")),
            Some("/blog/".to_string())
        );
    }

    #[test]
    fn test_canonical_url_strips_extension() {
        let root = Path::new("/site");
        assert_eq!(
            canonical_url(root, Path::new("/site/about.html")),
            Some("/about".to_string())
        );
        assert_eq!(
            canonical_url(root, Path::new("/site/blog/gemini-guide.html")),
            Some("/blog/gemini-guide".to_string())
        );
    }

    #[test]
    fn test_canonical_url_outside_root() {
        let root = Path::new("/site");
        assert_eq!(canonical_url(root, Path::new("/other/index.html")), None);
        assert_eq!(canonical_url(root, Path::new("/site/readme.txt")), None);
    }
}
