// src/report/mod.rs
// =============================================================================
// This module aggregates check outcomes into the final result set.
//
// Key functionality:
// - CheckStatus / CheckOutcome: what happened to a single link
// - ResultSet: counters + per-document problem lists for one scan run
// - record(): the single merge point every outcome flows through
// - print_summary(): human-readable output (there's also --json via serde)
//
// Design rule: only problems are materialized. A link that checks out alive
// produces no outcome and no entry anywhere - the summary lists what's wrong,
// not what's fine.
//
// Rust concepts:
// - Enums: To represent the outcome statuses
// - BTreeMap: An ordered map, so output order is stable between runs
// - serde derive: JSON output for free
// =============================================================================

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scan::Link;

// Represents the status of a link after checking
//
// #[derive(Serialize)] lets us convert to JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Link target resolves (never recorded - alive links produce no outcome)
    Alive,
    /// Link target does not resolve; counts toward the failure signal
    Dead,
    /// The URL itself is the empty string
    Empty,
    /// Link matched an exclude pattern and was skipped
    Ignored,
    /// Something unexpected went wrong while checking this one link
    Error,
}

impl CheckStatus {
    // Single-character marker used in the problem listing
    pub fn marker(&self) -> &'static str {
        match self {
            CheckStatus::Alive => "✓",
            CheckStatus::Dead => "✖",
            CheckStatus::Empty => "-",
            CheckStatus::Ignored => "/",
            CheckStatus::Error => "⚠",
        }
    }
}

// Represents the result of checking a single link
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// The link that was checked
    pub link: Link,
    /// What happened to it
    pub status: CheckStatus,
    /// Optional extra information (HTTP status code, error description)
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn new(link: Link, status: CheckStatus) -> Self {
        Self {
            link,
            status,
            detail: None,
        }
    }

    pub fn with_detail(link: Link, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            link,
            status,
            detail: Some(detail.into()),
        }
    }
}

// One entry in a document's problem list
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub url: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// The accumulator for one scan run
//
// Created at scan start, fed by record(), read once at the end to render
// the summary and compute the exit code.
//
// BTreeMap (not HashMap) keys the problems by document path in sorted
// order, so two scans of the same tree print identical output.
#[derive(Debug, Default, Serialize)]
pub struct ResultSet {
    pub total: usize,
    pub local: usize,
    pub remote: usize,
    pub empty: usize,
    pub skipped: usize,
    pub broken: usize,
    pub files_checked: usize,
    pub problems: BTreeMap<PathBuf, Vec<Problem>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Merges one outcome into the counters and problem lists
    //
    // This is the only place outcomes are applied. Check tasks return
    // values; a single coordinator loop calls record() with each of them,
    // so the counters never need locking.
    pub fn record(&mut self, outcome: CheckOutcome) {
        match outcome.status {
            // Alive links are implicit - nothing to report
            CheckStatus::Alive => return,
            CheckStatus::Dead => self.broken += 1,
            CheckStatus::Empty => self.empty += 1,
            CheckStatus::Ignored => self.skipped += 1,
            // Errors show up in the problem list but are not "broken"
            CheckStatus::Error => {}
        }

        self.problems
            .entry(outcome.link.source)
            .or_default()
            .push(Problem {
                url: outcome.link.url,
                status: outcome.status,
                detail: outcome.detail,
            });
    }

    // The overall failure signal: the scan fails iff something is broken.
    // Empty, ignored and errored links never fail the run.
    pub fn failed(&self) -> bool {
        self.broken > 0
    }
}

// Prints the human-readable summary: counter block first, then one section
// per document that had problems
pub fn print_summary(results: &ResultSet) {
    println!();
    println!("📊 Summary:");
    println!("   Total files checked: {}", results.files_checked);
    println!("   Total links checked: {}", results.total);
    println!("           Local links: {}", results.local);
    println!("          Remote links: {}", results.remote);
    println!("           Empty links: {}", results.empty);
    println!("          Broken links: {}", results.broken);
    println!("         Skipped links: {}", results.skipped);

    for (document, problems) in &results.problems {
        println!();
        println!("{}:", document.display());
        for problem in problems {
            match &problem.detail {
                Some(detail) => println!("[{}] {} ({})", problem.status.marker(), problem.url, detail),
                None => println!("[{}] {}", problem.status.marker(), problem.url),
            }
        }
    }

    println!();
    if results.broken == 0 {
        println!("✅ No broken links!");
    } else {
        println!("❌ {} broken link(s) found", results.broken);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BTreeMap instead of HashMap?
//    - BTreeMap keeps its keys sorted
//    - HashMap iteration order changes between runs (it's randomized!)
//    - Sorted keys mean the problem listing always comes out in the same
//      order - important for diffable CI logs and for our idempotence tests
//
// 2. Why does record() take the outcome by value?
//    - The outcome's strings move straight into the problem list
//    - No clone needed; the borrow checker proves nobody else still uses it
//
// 3. What does #[serde(skip_serializing_if = "Option::is_none")] do?
//    - Leaves the "detail" field out of the JSON when there isn't one
//    - Keeps the output compact instead of full of "detail": null
// -----------------------------------------------------------------------------
