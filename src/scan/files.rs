// src/scan/files.rs
// =============================================================================
// This module discovers the documents to scan.
//
// Given a root path, a document extension and a recurse flag it yields the
// sorted list of document paths. Sorting matters: it makes two scans of the
// same tree produce byte-identical summaries.
// =============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Collects the documents under `root` carrying the given extension
//
// The root is canonicalized first so every document path (and everything
// derived from it later, like link resolution candidates) is absolute.
// A root that is itself a document yields a single-element list.
pub fn discover(root: &Path, ext: &str, recurse: bool) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("cannot resolve path: {}", root.display()))?;

    if root.is_file() {
        return Ok(vec![root]);
    }

    // Depth 1 = just the root directory's own entries
    let max_depth = if recurse { usize::MAX } else { 1 };

    let mut documents = Vec::new();
    for entry in WalkDir::new(&root).max_depth(max_depth) {
        let entry = entry.context("error while walking the document tree")?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(ext) {
            documents.push(entry.into_path());
        }
    }

    documents.sort();
    Ok(documents)
}
