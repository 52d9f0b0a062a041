// src/checker/local.rs
// =============================================================================
// This module resolves local links using only filesystem lookups.
//
// The tricky part is the clean-URL case: documentation sites are served
// through extension-less "routed" URLs, so a link like "../other" inside
// docs/topic/index.md has no file named "other" anywhere. We have to
// reconstruct the static-site server's URL-to-file mapping ourselves:
//
//   1. Empty URL -> reported as empty
//   2. Image reference -> file must exist next to the source document
//   3. Direct document reference (ends in .md) -> same existence check
//   4. Anything else -> clean URL. Work out where the source document is
//      served from, resolve the link against that folder, then accept
//      either <target>/index.md or <target>.md
//
// Everything here is pure path arithmetic plus is_file() probes - no
// network, no retries, fully synchronous.
//
// Rust concepts:
// - Path/PathBuf and Component: Structured path manipulation
// - OsString: Appending an extension without going through lossy UTF-8
// =============================================================================

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::report::{CheckOutcome, CheckStatus};
use crate::scan::classify::strip_fragment;
use crate::scan::Link;

// Image suffixes get a plain existence check instead of route resolution
static IMAGE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    // Constant pattern, known to be valid
    Regex::new(r"(?i)\.(png|jpeg|jpg|gif|svg)$").unwrap()
});

// Checks one local link against the filesystem
//
// Returns None when the link resolves (only problems are materialized),
// or Some(outcome) with status Empty or Dead.
//
// `ext` is the configured document extension, e.g. ".md".
pub fn check_local_link(link: &Link, ext: &str) -> Option<CheckOutcome> {
    // The #fragment part only means something to a browser
    let url = strip_fragment(&link.url);

    debug!(
        "checking local link {:?} from {}",
        url,
        link.source.display()
    );

    if url.is_empty() {
        info!("empty link in {}", link.source.display());
        return Some(CheckOutcome::new(link.clone(), CheckStatus::Empty));
    }

    let source_dir = link.source.parent().unwrap_or_else(|| Path::new(""));

    // Images and direct document references resolve the same way: relative
    // to the folder the source document lives in
    if IMAGE_SUFFIX.is_match(url) || url.ends_with(ext) {
        let target = normalize(&source_dir.join(url));
        if target.is_file() {
            return None;
        }
        info!("broken link: {} ({} missing)", url, target.display());
        return Some(CheckOutcome::new(link.clone(), CheckStatus::Dead));
    }

    // Clean-URL (routed) reference from here on.
    //
    // Serving folder of the source document: index.md is served at its
    // parent directory, any other page.md is served at page/
    let index_name = format!("index{ext}");
    let serving_folder = if file_name_is(&link.source, &index_name) {
        source_dir.to_path_buf()
    } else {
        match link.source.file_stem() {
            Some(stem) => source_dir.join(stem),
            None => source_dir.to_path_buf(),
        }
    };

    let target_folder = normalize(&serving_folder.join(url));

    // Candidate 1: a folder with an index document inside
    let index_candidate = target_folder.join(&index_name);

    // Candidate 2: a sibling document named after the folder ("topic.md").
    // Disallowed when the folder itself is named "index", where it would
    // collide with candidate 1 of the parent ("index/index.md" vs "index.md").
    let mut sibling = target_folder.clone().into_os_string();
    sibling.push(ext);
    let sibling_candidate = PathBuf::from(sibling);
    let sibling_allowed = !file_name_is(&target_folder, "index");

    debug!(
        "routed candidates: {} | {}",
        index_candidate.display(),
        sibling_candidate.display()
    );

    if index_candidate.is_file() || (sibling_allowed && sibling_candidate.is_file()) {
        return None;
    }

    info!(
        "broken link: {} (neither {} nor {})",
        url,
        index_candidate.display(),
        sibling_candidate.display()
    );
    Some(CheckOutcome::new(link.clone(), CheckStatus::Dead))
}

// True if the path's final component equals `name`
fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(name)
}

// Lexically removes "." and ".." components.
//
// fs::canonicalize() would be the obvious tool, but it fails on paths that
// don't exist - and probing paths that may not exist is the entire job of
// this module. So we fold the components by hand instead:
// ".." pops a normal component, stays put at the root, and is kept verbatim
// past the start of a relative path.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not fs::canonicalize?
//    - It asks the OS to resolve the path, which fails if the path doesn't
//      exist
//    - Our candidate paths mostly DON'T exist - that's what we're testing
//    - So we normalize lexically: just component bookkeeping, no syscalls
//
// 2. What is Component?
//    - Path::components() splits a path into typed pieces
//    - Normal("docs"), RootDir, CurDir ("."), ParentDir ("..")
//    - Much safer than string-splitting on '/'
//
// 3. Why OsString for the sibling candidate?
//    - We need "docs/topic" + ".md" = "docs/topic.md"
//    - Path::join would add a separator; set_extension would eat an
//      existing dot; pushing onto the raw OsString does exactly what the
//      route needs
// -----------------------------------------------------------------------------
