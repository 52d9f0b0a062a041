// src/scan/classify.rs
// =============================================================================
// This module decides what kind of link a raw URL is.
//
// Classification precedence:
// 1. mailto:  -> Mailto (dropped, never checked)
// 2. matches an exclude pattern -> Excluded (reported as ignored)
// 3. starts with '#' -> PureAnchor (same-page reference, dropped)
// 4. matches the remote-URL pattern -> Remote
// 5. everything else -> Local
//
// Classification is a pure function of the URL text and the two filters.
// No filesystem, no network - the same URL always gets the same kind, which
// is what makes scans reproducible.
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;

// The kind a link gets assigned exactly once by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Points inside the document tree, resolved on disk
    Local,
    /// Absolute web URL, verified over the network
    Remote,
    /// mailto: reference, never checked
    Mailto,
    /// Same-page #fragment reference, never checked
    PureAnchor,
    /// Matched an exclude pattern
    Excluded,
}

// Generic absolute web URL pattern, used when no domain filter is set
const REMOTE_URL_PATTERN: &str =
    r"https?://(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)";

// The compiled classification filters for one scan run
pub struct Filters {
    remote: Regex,
    exclude: Vec<Regex>,
}

impl Filters {
    // Compiles the filters once, up front
    //
    // With a domain filter only URLs under that domain count as remote;
    // everything else (including absolute URLs to other hosts!) falls
    // through to Local. Without one, any absolute web URL is remote.
    pub fn new(domain: Option<&str>, exclude: &[String]) -> Result<Self> {
        let remote = match domain {
            Some(domain) => {
                let pattern = format!("https?://{}[=a-zA-Z0-9_/?&%+#.\\-]*", regex::escape(domain));
                Regex::new(&pattern)
                    .with_context(|| format!("invalid domain filter: {domain}"))?
            }
            // Constant pattern, known to be valid
            None => Regex::new(REMOTE_URL_PATTERN).unwrap(),
        };

        let exclude = exclude
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("invalid exclude pattern: {pattern}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { remote, exclude })
    }

    // Assigns the kind for one raw URL
    pub fn classify(&self, url: &str) -> LinkKind {
        if url.starts_with("mailto:") {
            return LinkKind::Mailto;
        }

        if self.exclude.iter().any(|regex| regex.is_match(url)) {
            return LinkKind::Excluded;
        }

        // A lone fragment refers within its own document and is never
        // checked. An EMPTY url is not an anchor though: it stays Local so
        // the resolver can report it as empty.
        if url.starts_with('#') {
            return LinkKind::PureAnchor;
        }

        // Unanchored search, like the other filters
        if self.remote.is_match(url) {
            LinkKind::Remote
        } else {
            LinkKind::Local
        }
    }
}

// Strips a trailing #fragment: "page#section" -> "page"
//
// Local targets are files on disk; the fragment part only means something
// to a browser.
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}
