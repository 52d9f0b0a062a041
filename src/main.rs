// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Run the scan pipeline over the documentation tree
// 3. Render the result set (summary table or JSON)
// 4. Exit with proper code (0 = success, 1 = broken links, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to convert CLI values into config
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - local and remote link checking
mod cli; // src/cli.rs - command-line parsing
mod report; // src/report/ - result aggregation and rendering
mod scan; // src/scan/ - discovery, extraction, classification, pipeline

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;

use checker::remote::{default_headers, RemoteConfig};
use checker::CheckMode;
use cli::{Cli, HttpMethod};
use scan::ScanConfig;

// The #[tokio::main] attribute transforms our async main into a real main
// function by creating a tokio runtime around it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // An unexpected setup error (bad path, bad regex, bad header):
            // print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err   = setup error (becomes exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Logging goes to stderr so it never mixes with the JSON output.
    // Default WARN keeps normal runs quiet; -v shows per-link events.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli)?;

    if !cli.json {
        println!("🔍 Scanning {} for broken links...", config.root.display());
    }

    let results = scan::run(&config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        report::print_summary(&results);
    }

    // A failure on any single link never lands here - the scan always
    // completes. Only the exit code tells CI whether something is broken.
    Ok(if results.failed() { 1 } else { 0 })
}

// Converts parsed CLI arguments into the scan configuration
fn build_config(cli: &Cli) -> Result<ScanConfig> {
    let mut headers = default_headers();
    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("invalid header (expected \"Name: Value\"): {header}"))?;
        let name: HeaderName = name
            .trim()
            .parse()
            .with_context(|| format!("invalid header name in: {header}"))?;
        let value: HeaderValue = value
            .trim()
            .parse()
            .with_context(|| format!("invalid header value in: {header}"))?;
        headers.insert(name, value);
    }

    let remote = RemoteConfig {
        headers,
        method: match cli.method {
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Get => Method::GET,
        },
        mode: if cli.sync {
            CheckMode::Sequential
        } else {
            CheckMode::Concurrent
        },
        concurrency: cli.concurrency,
    };

    Ok(ScanConfig {
        root: cli.path.clone(),
        ext: cli.ext.clone(),
        recurse: cli.recurse,
        domain: cli.domain.clone(),
        exclude: cli.exclude.clone(),
        local_only: cli.local_only,
        remote,
    })
}
