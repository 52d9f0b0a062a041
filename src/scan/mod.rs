// src/scan/mod.rs
// =============================================================================
// This module wires the scan pipeline together:
//
//   documents -> extract -> classify -> (local | remote checks) -> ResultSet
//
// Submodules:
// - files: Discovers the documents to scan
// - extract: Pulls raw link URLs out of document text
// - classify: Decides local / remote / mailto / anchor / excluded
//
// The ResultSet is owned here and fed through a single loop - check tasks
// return values, they never write shared state. That's what makes the
// concurrent remote mode safe without any locking.
// =============================================================================

pub mod classify;
pub mod extract;
pub mod files;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::checker;
use crate::checker::remote::RemoteConfig;
use crate::report::{CheckOutcome, CheckStatus, ResultSet};
use classify::{Filters, LinkKind};

// One link found in one document
//
// The kind is assigned exactly once by the classifier and never changes.
#[derive(Debug, Clone)]
pub struct Link {
    /// The raw URL text, exactly as written in the document
    pub url: String,
    /// The document the link was found in
    pub source: PathBuf,
    pub kind: LinkKind,
}

// Everything one scan run needs to know
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root of the documentation tree (or a single document)
    pub root: PathBuf,
    /// Document extension, e.g. ".md"
    pub ext: String,
    pub recurse: bool,
    /// Only URLs under this domain count as remote
    pub domain: Option<String>,
    /// Regexes of links to skip
    pub exclude: Vec<String>,
    /// Skip remote checking entirely
    pub local_only: bool,
    pub remote: RemoteConfig,
}

// Runs one full scan and returns the finalized result set
pub async fn run(config: &ScanConfig) -> Result<ResultSet> {
    let filters = Filters::new(config.domain.as_deref(), &config.exclude)?;
    let documents = files::discover(&config.root, &config.ext, config.recurse)?;

    let mut results = ResultSet::new();
    let mut local_links = Vec::new();
    let mut remote_links = Vec::new();

    for path in documents {
        // Invalid UTF-8 is replaced, not fatal - one odd file must not
        // abort the scan
        let bytes = fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        results.files_checked += 1;

        for url in extract::extract_links(&text) {
            let kind = filters.classify(&url);
            let link = Link {
                url,
                source: path.clone(),
                kind,
            };
            match kind {
                // Mail links and same-page anchors are never checked and
                // never counted
                LinkKind::Mailto | LinkKind::PureAnchor => {}
                LinkKind::Excluded => {
                    results.record(CheckOutcome::new(link, CheckStatus::Ignored));
                }
                LinkKind::Remote => remote_links.push(link),
                LinkKind::Local => local_links.push(link),
            }
        }
    }

    info!(
        "extracted {} local and {} remote links from {} files",
        local_links.len(),
        remote_links.len(),
        results.files_checked
    );

    // Local resolution: synchronous, filesystem only
    for link in &local_links {
        results.total += 1;
        results.local += 1;
        if let Some(outcome) = checker::check_local_link(link, &config.ext) {
            results.record(outcome);
        }
    }

    // Remote checking: once, over the full set. Under --local-only remote
    // links are not checked and not counted.
    if !config.local_only {
        results.total += remote_links.len();
        results.remote += remote_links.len();

        let mut outcomes = checker::check_remote_links(remote_links, &config.remote).await?;

        // Concurrent completion order is nondeterministic; sort so every
        // mode renders the same summary for the same findings
        outcomes.sort_by(|a, b| {
            (&a.link.source, &a.link.url).cmp(&(&b.link.source, &b.link.url))
        });
        for outcome in outcomes {
            results.record(outcome);
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckMode;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn local_only_config(root: &Path) -> ScanConfig {
        ScanConfig {
            root: root.to_path_buf(),
            ext: ".md".to_string(),
            recurse: true,
            domain: None,
            exclude: vec![r"skip\.example".to_string()],
            local_only: true,
            remote: RemoteConfig {
                mode: CheckMode::Sequential,
                ..RemoteConfig::default()
            },
        }
    }

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("docs/index.md"),
            "[ok](other)\n\
             [gone](missing)\n\
             [img](pic.png)\n\
             [empty]()\n\
             [mail](mailto:a@b.c)\n\
             [anchor](#top)\n\
             [skipped](http://skip.example.com/x)\n",
        );
        write(&dir.path().join("docs/other.md"), "nothing here");
        dir
    }

    #[tokio::test]
    async fn test_local_only_scan_counts() {
        let dir = sample_tree();
        let results = run(&local_only_config(&dir.path().join("docs"))).await.unwrap();

        assert_eq!(results.files_checked, 2);
        // ok, gone, pic.png, empty - mailto/anchor dropped, skipped excluded
        assert_eq!(results.local, 4);
        assert_eq!(results.total, 4);
        assert_eq!(results.remote, 0);
        assert_eq!(results.empty, 1);
        assert_eq!(results.skipped, 1);
        // "gone" and the missing image
        assert_eq!(results.broken, 2);
        assert!(results.failed());
    }

    #[tokio::test]
    async fn test_scan_is_idempotent() {
        let dir = sample_tree();
        let config = local_only_config(&dir.path().join("docs"));

        let first = run(&config).await.unwrap();
        let second = run(&config).await.unwrap();

        // Identical counts AND identical problem lists, byte for byte
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_clean_tree_passes() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("docs/index.md"), "[fine](other)");
        write(&dir.path().join("docs/other.md"), "");

        let results = run(&local_only_config(&dir.path().join("docs"))).await.unwrap();
        assert_eq!(results.broken, 0);
        assert!(!results.failed());
        assert!(results.problems.is_empty());
    }

    #[tokio::test]
    async fn test_problem_entries_carry_the_source_document() {
        let dir = sample_tree();
        let results = run(&local_only_config(&dir.path().join("docs"))).await.unwrap();

        let index_doc = results
            .problems
            .keys()
            .find(|p| p.ends_with("index.md"))
            .expect("index.md should have problems");
        let urls: Vec<&str> = results.problems[index_doc]
            .iter()
            .map(|p| p.url.as_str())
            .collect();
        assert!(urls.contains(&"missing"));
        assert!(urls.contains(&"pic.png"));
    }
}
