// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - ValueEnum: Restrict a flag to a fixed set of values
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "docs-guardian",
    version = "0.1.0",
    about = "A CLI tool to scan Markdown documentation trees for broken links",
    long_about = "docs-guardian walks a documentation tree, extracts every link, resolves \
                  local links against static-site routing rules (clean URLs, index files) \
                  and verifies remote links over HTTP. Perfect for CI pipelines that keep \
                  docs honest."
)]
pub struct Cli {
    /// Root of the documentation tree (or a single document)
    ///
    /// This is a positional argument (required, no flag needed)
    pub path: PathBuf,

    /// Document extension to scan for
    #[arg(long, default_value = ".md")]
    pub ext: String,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recurse: bool,

    /// Only URLs under this domain count as remote links
    ///
    /// Absolute URLs to other hosts are then treated as local references
    #[arg(long)]
    pub domain: Option<String>,

    /// Skip links matching this regex; repeat the flag for multiple patterns
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Check local links only - no network traffic at all
    #[arg(long)]
    pub local_only: bool,

    /// Check remote links one at a time instead of concurrently
    #[arg(long)]
    pub sync: bool,

    /// Cap on simultaneously in-flight remote checks
    ///
    /// Without it every remote link is dispatched at once, which is fast
    /// but can exhaust sockets on very large trees
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// HTTP method for the first probe (the retry is always GET)
    #[arg(long, value_enum, default_value_t = HttpMethod::Head)]
    pub method: HttpMethod,

    /// Extra request header as "Name: Value"; repeat for multiple headers
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Output the result set as JSON instead of a summary table
    #[arg(long)]
    pub json: bool,

    /// Verbose per-link logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

// The primary probe method
//
// HEAD is lightweight (no body); GET is slower but some anti-crawling
// setups only answer it properly
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
    Head,
    Get,
}
