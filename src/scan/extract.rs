// src/scan/extract.rs
// =============================================================================
// This module extracts raw link URLs from document text.
//
// It is deliberately a best-effort regex scan, NOT a markup parser:
// - Markdown links: the (url) part of [label](url)
// - HTML anchors: <a href="url"> with either quote style
//
// Known limitation (by design): link syntax inside fenced code blocks or
// escaped contexts is extracted too. A structural parser would filter those,
// but this tool trades that precision for a tiny, format-agnostic scanner.
//
// Rust concepts:
// - LazyLock: Compile each regex once, on first use
// - captures_iter: Iterate over all matches with their capture groups
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

// Markdown: everything between "](" and the next ")"
static MD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    // The pattern is constant and known to be valid
    Regex::new(r"\]\(([^)]*)\)").unwrap()
});

// HTML anchor href with double or single quotes.
// The regex crate has no backreferences, so the two quote styles are
// spelled out as alternatives instead of href=(["'])...\1
static HREF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s+(?:[^>]*?\s+)?href=(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

// Extracts all raw link URLs from a document's text, in discovery order
//
// Markdown matches come first, then HTML anchor matches. The order is
// preserved but carries no meaning - every link is checked either way.
//
// Example input:
//   "See [the docs](../reference) or <a href='https://example.com'>here</a>"
//
// Example output:
//   vec!["../reference", "https://example.com"]
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links = Vec::new();

    for caps in MD_LINK.captures_iter(text) {
        links.push(caps[1].to_string());
    }

    for caps in HREF_LINK.captures_iter(text) {
        // Exactly one of the two groups matched, depending on quote style
        if let Some(url) = caps.get(1).or_else(|| caps.get(2)) {
            links.push(url.as_str().to_string());
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_markdown_link() {
        let text = "Check out [Rust](https://www.rust-lang.org)!";
        assert_eq!(extract_links(text), vec!["https://www.rust-lang.org"]);
    }

    #[test]
    fn test_extract_relative_markdown_link() {
        let text = "See [the guide](../guide) and [setup](setup.md).";
        assert_eq!(extract_links(text), vec!["../guide", "setup.md"]);
    }

    #[test]
    fn test_extract_empty_markdown_link() {
        // [label]() happens in half-written docs; the empty URL must be
        // surfaced so the resolver can report it
        let text = "A [forgotten]() link";
        assert_eq!(extract_links(text), vec![""]);
    }

    #[test]
    fn test_extract_html_href_double_quotes() {
        let text = r#"<a href="https://example.com/page">link</a>"#;
        assert_eq!(extract_links(text), vec!["https://example.com/page"]);
    }

    #[test]
    fn test_extract_html_href_single_quotes() {
        let text = "<a href='local/page'>link</a>";
        assert_eq!(extract_links(text), vec!["local/page"]);
    }

    #[test]
    fn test_extract_html_href_with_other_attributes() {
        let text = r#"<a class="nav" target="_blank" href="https://example.com">x</a>"#;
        assert_eq!(extract_links(text), vec!["https://example.com"]);
    }

    #[test]
    fn test_markdown_before_html() {
        let text = r#"<a href="second">x</a> and [first](first)"#;
        assert_eq!(extract_links(text), vec!["first", "second"]);
    }

    #[test]
    fn test_fenced_code_blocks_are_not_filtered() {
        // Documented limitation: the scanner has no notion of code fences
        let text = "```\n[example](inside-fence)\n```";
        assert_eq!(extract_links(text), vec!["inside-fence"]);
    }

    #[test]
    fn test_plain_text_has_no_links() {
        assert!(extract_links("nothing to see here (really)").is_empty());
    }
}
