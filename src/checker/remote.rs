// src/checker/remote.rs
// =============================================================================
// This module checks remote links by making HTTP requests.
//
// Per-link protocol:
// - Primary probe (HEAD by default) with a short timeout, following
//   redirects, certificate verification off
// - Status 200 -> alive
// - Retryable status (400/404/405/503) -> one GET retry; 200 rescues it
// - Redirect limit exceeded -> alive (crawler defenses, not broken links)
// - Timeout / connection failure -> same GET retry; failing that, dead
// - Any other non-200 -> dead, no retry
// - Anything else unexpected -> an Error outcome; never aborts the scan
//
// Two execution modes with identical outcome sets: concurrent (all checks
// in flight at once, optionally capped) and sequential (one at a time).
// Each check is independent and returns a value; the caller merges them.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - buffer_unordered vs join_all: Capped vs unbounded fan-out
// - From: To reduce a client error to the kinds the protocol cares about
// =============================================================================

use anyhow::{Context, Result};
use futures::future;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::report::{CheckOutcome, CheckStatus};
use crate::scan::Link;

// Some sites reject anything that doesn't look like a browser
// http://www.useragentstring.com
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:64.0) Gecko/20100101 Firefox/64.0";

// Per-request timeout. There is no whole-run deadline: total runtime is
// bounded only by the link count times this (callers needing a hard
// deadline must impose one externally).
const TIMEOUT: Duration = Duration::from_secs(3);

// Statuses worth a second opinion: anti-crawling setups often answer the
// cheap probe with these while a real GET would succeed
const RETRY_STATUSES: [u16; 4] = [400, 404, 405, 503];

// Give up following redirects after this many hops
const MAX_REDIRECTS: usize = 5;

// How the remote set is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// All checks dispatched with overlapping I/O
    Concurrent,
    /// Strictly one after another
    Sequential,
}

// Configuration for one remote checking pass
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Request headers (always includes a User-Agent)
    pub headers: HeaderMap,
    /// Method for the primary probe; the retry is always GET
    pub method: Method,
    pub mode: CheckMode,
    /// Cap on in-flight requests; None = unbounded fan-out
    pub concurrency: Option<usize>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            headers: default_headers(),
            method: Method::HEAD,
            mode: CheckMode::Concurrent,
            concurrency: None,
        }
    }
}

// The default header set: just the fixed User-Agent
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

// Checks the full remote-link set and returns outcomes for the links that
// are NOT reachable - success is implicit, like everywhere else.
//
// Duplicates in the input are checked independently; the checker does not
// deduplicate.
pub async fn check_remote_links(links: Vec<Link>, config: &RemoteConfig) -> Result<Vec<CheckOutcome>> {
    let client = build_client(config.headers.clone())?;

    // The mode is picked once, out here. check_single_link() itself has no
    // idea which mode it is running under.
    let outcomes = match config.mode {
        CheckMode::Concurrent => check_concurrent(client, links, config).await,
        CheckMode::Sequential => check_sequential(client, links, config).await,
    };

    Ok(outcomes)
}

fn build_client(headers: HeaderMap) -> Result<Client> {
    // Certificate verification is off: a docs link to a host with a broken
    // TLS setup still points at something reachable
    Client::builder()
        .timeout(TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true)
        .default_headers(headers)
        .build()
        .context("failed to build HTTP client")
}

// Concurrent mode: everything in flight at once, unless capped
async fn check_concurrent(client: Client, links: Vec<Link>, config: &RemoteConfig) -> Vec<CheckOutcome> {
    let method = config.method.clone();
    let checks = links.into_iter().map(|link| {
        // Client is cheap to clone (it's reference-counted internally)
        let client = client.clone();
        let method = method.clone();
        async move { check_single_link(&client, link, method).await }
    });

    let results: Vec<Option<CheckOutcome>> = match config.concurrency {
        // buffer_unordered(n) keeps at most n requests in flight and yields
        // results as they complete
        Some(cap) => stream::iter(checks).buffer_unordered(cap.max(1)).collect().await,
        // Default: unbounded fan-out over the whole set
        None => future::join_all(checks).await,
    };

    results.into_iter().flatten().collect()
}

// Sequential mode: same checks, one path of execution
async fn check_sequential(client: Client, links: Vec<Link>, config: &RemoteConfig) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();
    for link in links {
        if let Some(outcome) = check_single_link(&client, link, config.method.clone()).await {
            outcomes.push(outcome);
        }
    }
    outcomes
}

// Why a request failed, reduced to the kinds the protocol cares about.
// Retry eligibility is a pure function of this kind and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestFailure {
    /// More redirects than the policy allows
    RedirectLimit,
    /// The request didn't complete within the timeout
    Timeout,
    /// Could not connect at all (DNS, refused, unreachable)
    Connection,
    /// Anything else (malformed URL, protocol error, ...)
    Other,
}

impl RequestFailure {
    fn should_retry(self) -> bool {
        matches!(self, RequestFailure::Timeout | RequestFailure::Connection)
    }
}

impl From<&reqwest::Error> for RequestFailure {
    fn from(error: &reqwest::Error) -> Self {
        if error.is_redirect() {
            RequestFailure::RedirectLimit
        } else if error.is_timeout() {
            RequestFailure::Timeout
        } else if error.is_connect() {
            RequestFailure::Connection
        } else {
            RequestFailure::Other
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status.as_u16())
}

// Checks a single remote link
//
// Returns None when the link counts as alive. A failure here only ever
// affects this one link - nothing propagates.
async fn check_single_link(client: &Client, link: Link, method: Method) -> Option<CheckOutcome> {
    // Reject malformed URLs before handing them to the client, so one bad
    // link can't do anything worse than produce an Error outcome
    if let Err(error) = Url::parse(&link.url) {
        return Some(CheckOutcome::with_detail(
            link,
            CheckStatus::Error,
            format!("invalid URL: {error}"),
        ));
    }

    debug!("checking remote link: {}", link.url);

    match client.request(method, &link.url).send().await {
        Ok(response) => {
            let status = response.status();
            if status == StatusCode::OK {
                debug!("OK: {}", link.url);
                return None;
            }
            if is_retryable_status(status) && retry_with_get(client, &link.url).await {
                info!("OK after retry: {}", link.url);
                return None;
            }
            // Dead either way; the detail is the ORIGINAL status, not the
            // retry's
            info!("dead link ({}): {}", status.as_u16(), link.url);
            Some(CheckOutcome::with_detail(
                link,
                CheckStatus::Dead,
                status.as_u16().to_string(),
            ))
        }
        Err(error) => {
            let failure = RequestFailure::from(&error);
            match failure {
                // Heuristic: endless redirect chains are almost always
                // crawler defenses, not actually-broken links
                RequestFailure::RedirectLimit => {
                    info!("OK (redirect limit): {}", link.url);
                    None
                }
                _ if failure.should_retry() => {
                    if retry_with_get(client, &link.url).await {
                        info!("OK after retry: {}", link.url);
                        None
                    } else {
                        info!("dead link ({}): {}", error, link.url);
                        Some(CheckOutcome::with_detail(link, CheckStatus::Dead, error.to_string()))
                    }
                }
                _ => Some(CheckOutcome::with_detail(link, CheckStatus::Error, error.to_string())),
            }
        }
    }
}

// The one retry every eligible link gets: always GET, no backoff, and the
// body is never read - we only care whether the server says 200
async fn retry_with_get(client: &Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) => response.status() == StatusCode::OK,
        Err(_) => false,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why join_all AND buffer_unordered?
//    - join_all launches every future at once - maximum overlap, no cap
//    - buffer_unordered(n) is the same idea with at most n in flight
//    - The unbounded default matches the tool's history; the cap exists
//      because thousands of simultaneous sockets can exhaust a machine
//
// 2. Why does check_single_link return Option instead of Result?
//    - A dead link is not an error in the Rust sense - it's a finding
//    - None = nothing to report (alive), Some = a materialized problem
//    - Real errors are folded into the outcome too, so the scan never stops
//
// 3. What is From<&reqwest::Error> doing?
//    - reqwest reports failures as one opaque error type with is_* probes
//    - We reduce it to our own enum ONCE, then everything downstream
//      (retry? alive? dead?) is a decision about that enum
//    - This keeps retry policy out of the HTTP client's vocabulary
//
// 4. Why clone the client into each task?
//    - Each async task needs its own handle
//    - Client is an Arc internally, so clones share the connection pool
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::classify::LinkKind;
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread;
    use tiny_http::{Header, Response, Server, StatusCode as HttpStatus};

    fn link(url: &str) -> Link {
        Link {
            url: url.to_string(),
            source: PathBuf::from("doc.md"),
            kind: LinkKind::Remote,
        }
    }

    fn test_client() -> Client {
        build_client(default_headers()).unwrap()
    }

    // Spawns a server answering every request with the given status
    fn serve_status(status: u16) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let _ = request.respond(Response::empty(HttpStatus(status)));
            }
        });
        format!("http://{addr}/")
    }

    // Spawns a server that rejects HEAD with the given status but accepts GET
    fn serve_head_rejecting(head_status: u16) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let status = if matches!(request.method(), tiny_http::Method::Head) {
                    head_status
                } else {
                    200
                };
                let _ = request.respond(Response::empty(HttpStatus(status)));
            }
        });
        format!("http://{addr}/")
    }

    // Spawns a server that redirects every request back to itself
    fn serve_redirect_loop() -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let location = Header::from_bytes(&b"Location"[..], &b"/again"[..]).unwrap();
                let _ = request.respond(Response::empty(HttpStatus(302)).with_header(location));
            }
        });
        format!("http://{addr}/")
    }

    // An address nothing is listening on
    fn dead_address() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/")
    }

    #[test]
    fn test_retryable_status_set() {
        for code in [400, 404, 405, 503] {
            assert!(is_retryable_status(StatusCode::from_u16(code).unwrap()));
        }
        assert!(!is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_retry_eligibility_is_a_function_of_failure_kind() {
        assert!(RequestFailure::Timeout.should_retry());
        assert!(RequestFailure::Connection.should_retry());
        assert!(!RequestFailure::RedirectLimit.should_retry());
        assert!(!RequestFailure::Other.should_retry());
    }

    #[tokio::test]
    async fn test_ok_link_produces_no_outcome() {
        let url = serve_status(200);
        let outcome = check_single_link(&test_client(), link(&url), Method::HEAD).await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_persistent_404_is_dead_with_status_detail() {
        let url = serve_status(404);
        let outcome = check_single_link(&test_client(), link(&url), Method::HEAD)
            .await
            .unwrap();
        assert_eq!(outcome.status, CheckStatus::Dead);
        assert_eq!(outcome.detail.as_deref(), Some("404"));
    }

    #[tokio::test]
    async fn test_head_rejection_rescued_by_get_retry() {
        let url = serve_head_rejecting(405);
        let outcome = check_single_link(&test_client(), link(&url), Method::HEAD).await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_non_retryable_status_is_dead_without_retry() {
        // 500 is not in the retry set, so even a GET-friendly server
        // doesn't get a second chance
        let url = serve_head_rejecting(500);
        let outcome = check_single_link(&test_client(), link(&url), Method::HEAD)
            .await
            .unwrap();
        assert_eq!(outcome.status, CheckStatus::Dead);
        assert_eq!(outcome.detail.as_deref(), Some("500"));
    }

    #[tokio::test]
    async fn test_redirect_storm_counts_as_alive() {
        let url = serve_redirect_loop();
        let outcome = check_single_link(&test_client(), link(&url), Method::HEAD).await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_is_dead_with_description() {
        let url = dead_address();
        let outcome = check_single_link(&test_client(), link(&url), Method::HEAD)
            .await
            .unwrap();
        assert_eq!(outcome.status, CheckStatus::Dead);
        assert!(outcome.detail.is_some());
    }

    #[tokio::test]
    async fn test_malformed_url_is_an_error_outcome() {
        let outcome = check_single_link(&test_client(), link("https://"), Method::HEAD)
            .await
            .unwrap();
        assert_eq!(outcome.status, CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_all_modes_produce_the_same_outcome_set() {
        let ok = serve_status(200);
        let dead = serve_status(404);
        let links = vec![link(&ok), link(&dead), link(&ok)];

        let mut sets = Vec::new();
        for (mode, concurrency) in [
            (CheckMode::Concurrent, None),
            (CheckMode::Concurrent, Some(2)),
            (CheckMode::Sequential, None),
        ] {
            let config = RemoteConfig {
                mode,
                concurrency,
                ..RemoteConfig::default()
            };
            let outcomes = check_remote_links(links.clone(), &config).await.unwrap();
            let mut set: Vec<(String, CheckStatus)> = outcomes
                .into_iter()
                .map(|o| (o.link.url, o.status))
                .collect();
            set.sort_by(|a, b| a.0.cmp(&b.0));
            sets.push(set);
        }

        assert_eq!(sets[0], sets[1]);
        assert_eq!(sets[1], sets[2]);
        // Exactly the one dead link, in every mode
        assert_eq!(sets[0].len(), 1);
        assert_eq!(sets[0][0].1, CheckStatus::Dead);
    }
}
