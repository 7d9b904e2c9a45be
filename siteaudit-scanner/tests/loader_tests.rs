// Tests for corpus loading

use siteaudit_scanner::loader::Loader;
use siteaudit_scanner::ScanError;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sample_site() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "index.html",
        r#"<html><head><title>Home</title></head><body><a href="/about">About</a></body></html>"#,
    );
    write(root, "about.html", "<title>About</title>");
    write(root, "layout_template.html", "<title>{{ title }}</title>");
    write(root, "notes.txt", "not html");
    write(root, "blog/index.html", "<title>Blog</title>");
    write(root, "blog/first-post.html", "<title>First</title>");
    write(root, "blog/nested/deep.html", "<title>Ignored</title>");
    write(root, "drafts/hidden.html", "<title>Hidden</title>");
    dir
}

// ============================================================================
// Page Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_load_pages_derives_canonical_urls() {
    let site = sample_site();
    let pages = Loader::new(site.path()).load_pages().await.unwrap();

    let urls: Vec<&str> = pages.iter().map(|p| p.canonical_url.as_str()).collect();
    assert_eq!(urls, vec!["/about", "/blog/first-post", "/blog/", "/"]);
}

#[tokio::test]
async fn test_load_pages_skips_templates_and_other_dirs() {
    let site = sample_site();
    let pages = Loader::new(site.path()).load_pages().await.unwrap();

    assert!(pages.iter().all(|p| p.canonical_url != "/layout_template"));
    assert!(pages.iter().all(|p| !p.canonical_url.starts_with("/drafts")));
    assert!(pages.iter().all(|p| p.canonical_url != "/blog/nested/deep"));
}

#[tokio::test]
async fn test_load_pages_parses_content() {
    let site = sample_site();
    let pages = Loader::new(site.path()).load_pages().await.unwrap();

    let home = pages.iter().find(|p| p.canonical_url == "/").unwrap();
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.links.len(), 1);
    assert_eq!(home.links[0].href, "/about");
    assert!(home.source_path.ends_with("index.html"));
}

#[tokio::test]
async fn test_load_pages_custom_content_dirs() {
    let site = sample_site();
    let pages = Loader::new(site.path())
        .with_content_dirs(vec!["drafts".to_string(), "missing".to_string()])
        .load_pages()
        .await
        .unwrap();

    let urls: Vec<&str> = pages.iter().map(|p| p.canonical_url.as_str()).collect();
    assert_eq!(urls, vec!["/about", "/drafts/hidden", "/"]);
}

#[tokio::test]
async fn test_load_pages_is_deterministic_across_worker_counts() {
    let site = sample_site();
    let single = Loader::new(site.path()).with_workers(1).load_pages().await.unwrap();
    let many = Loader::new(site.path()).with_workers(16).load_pages().await.unwrap();

    assert_eq!(single, many);
}

#[tokio::test]
async fn test_unreadable_file_is_skipped() {
    let site = sample_site();
    // Invalid UTF-8 cannot be read as a string
    fs::write(site.path().join("binary.html"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let pages = Loader::new(site.path()).load_pages().await.unwrap();
    assert_eq!(pages.len(), 4);
    assert!(pages.iter().all(|p| p.canonical_url != "/binary"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_broken_entries_do_not_abort_the_run() {
    let site = sample_site();
    std::os::unix::fs::symlink(
        site.path().join("gone.html"),
        site.path().join("dangling.html"),
    )
    .unwrap();

    let pages = Loader::new(site.path()).load_pages().await.unwrap();
    assert_eq!(pages.len(), 4);
    assert!(pages.iter().all(|p| p.canonical_url != "/dangling"));
}

#[tokio::test]
async fn test_missing_root_is_an_error() {
    let site = TempDir::new().unwrap();
    let missing = site.path().join("nope");

    let result = Loader::new(&missing).load_pages().await;
    assert!(matches!(result, Err(ScanError::RootNotFound(_))));
}

#[tokio::test]
async fn test_empty_root_yields_empty_corpus() {
    let site = TempDir::new().unwrap();
    let corpus = Loader::new(site.path()).load().await.unwrap();

    assert!(corpus.pages.is_empty());
    assert!(corpus.sitemap.is_none());
    assert!(corpus.redirects.is_empty());
}

#[tokio::test]
async fn test_progress_callback_called_per_page() {
    let site = sample_site();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    Loader::new(site.path())
        .with_progress_callback(Arc::new(move |_count: usize, url: String| {
            seen_clone.lock().unwrap().push(url);
        }))
        .load_pages()
        .await
        .unwrap();

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["/", "/about", "/blog/", "/blog/first-post"]);
}

// ============================================================================
// Sitemap And Redirect Table Tests
// ============================================================================

#[tokio::test]
async fn test_load_reads_sitemap_and_redirects() {
    let site = sample_site();
    write(
        site.path(),
        "sitemap.xml",
        r#"<urlset><url><loc>https://example.com/</loc></url><url><loc>https://example.com/about</loc></url></urlset>"#,
    );
    write(site.path(), "_redirects", "/go/pro https://shop.example.net 302\n");

    let corpus = Loader::new(site.path()).load().await.unwrap();

    let sitemap = corpus.sitemap.unwrap();
    assert!(sitemap.contains("/"));
    assert!(sitemap.contains("/about"));
    assert!(corpus.redirects.contains("/go/pro"));
}
