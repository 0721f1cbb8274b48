//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with a browser user agent
//! - The Fetch Gate: bounded-concurrency fetching with a per-request timeout
//! - Error classification into status, transport error and timeout outcomes

use crate::config::{Config, HttpConfig};
use crate::crawler::frontier::Link;
use crate::SweeperError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of fetching one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered
    Status {
        /// HTTP status code of the final response
        code: u16,
        /// URL after redirects
        final_url: String,
    },

    /// DNS failure, refused connection, TLS failure, redirect loop, bad URL
    TransportError {
        /// Error description
        message: String,
    },

    /// The request did not complete within the per-request timeout
    Timeout,
}

impl FetchOutcome {
    /// Returns true for a 200 response
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Status { code: 200, .. })
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub parent: String,
    pub outcome: FetchOutcome,
    /// Page text, present only when requested and the response was a textual 200
    pub body: Option<String>,
}

/// Builds an HTTP client with proper configuration
///
/// The client is shared by every fetch in a run so connections are reused.
///
/// # Arguments
///
/// * `config` - The HTTP configuration (user agent, certificate policy)
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use link_sweeper::config::HttpConfig;
/// use link_sweeper::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Bounded-concurrency fetch executor
///
/// Every fetch holds a semaphore permit for its whole duration, so no more
/// than `concurrency_limit` requests are ever outstanding. The gate is cheap
/// to clone; clones share the client, the permits and the counters.
#[derive(Debug, Clone)]
pub struct FetchGate {
    client: Client,
    permits: Arc<Semaphore>,
    timeout: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter on every exit path
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FetchGate {
    /// Creates a gate
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `concurrency_limit` - Maximum outstanding fetches (at least 1)
    /// * `timeout` - Per-request timeout covering headers and body
    pub fn new(client: Client, concurrency_limit: usize, timeout: Duration) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(concurrency_limit.max(1))),
            timeout,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builds the gate and its client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.crawl.timeout);
        let client = build_http_client(&config.http, timeout)?;
        Ok(Self::new(client, config.crawl.concurrency_limit, timeout))
    }

    /// Highest number of simultaneously outstanding fetches seen so far
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Fetches one link
    ///
    /// Never fails: every problem is folded into the returned outcome.
    /// `capture_body` asks for the page text of a textual 200 response.
    pub async fn fetch(&self, link: Link, capture_body: bool) -> FetchResult {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return FetchResult {
                    url: link.url,
                    parent: link.parent,
                    outcome: FetchOutcome::TransportError {
                        message: "Fetch gate closed".to_string(),
                    },
                    body: None,
                }
            }
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let (outcome, body) =
            match tokio::time::timeout(self.timeout, self.request(&link.url, capture_body)).await {
                Ok(result) => result,
                Err(_) => (FetchOutcome::Timeout, None),
            };

        tracing::debug!("Fetched {} -> {:?}", link.url, outcome);

        FetchResult {
            url: link.url,
            parent: link.parent,
            outcome,
            body,
        }
    }

    /// Fetches a batch of links
    ///
    /// Results are returned in completion order, not submission order; match
    /// them to inputs by `url`/`parent`.
    pub async fn fetch_all(&self, links: Vec<Link>) -> Vec<FetchResult> {
        self.fetch_batch(links.into_iter().map(|l| (l, false)).collect())
            .await
    }

    /// Fetches a batch where each link says whether its body is wanted
    pub async fn fetch_batch(&self, requests: Vec<(Link, bool)>) -> Vec<FetchResult> {
        let mut tasks = JoinSet::new();

        for (link, capture_body) in requests {
            let gate = self.clone();
            tasks.spawn(async move { gate.fetch(link, capture_body).await });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }

        results
    }

    /// Fetches a page and returns its text
    ///
    /// Used where a page body is required (seed discovery, static visibility
    /// check). Anything other than a textual 200 is an error.
    pub async fn fetch_text(&self, url: &str) -> Result<String, SweeperError> {
        let result = self.fetch(Link::new(url, url), true).await;

        match (result.outcome, result.body) {
            (FetchOutcome::Status { code: 200, .. }, Some(body)) => Ok(body),
            (FetchOutcome::Status { code: 200, .. }, None) => Err(SweeperError::Discovery {
                url: url.to_string(),
                message: "Response is not text".to_string(),
            }),
            (FetchOutcome::Status { code, .. }, _) => Err(SweeperError::Discovery {
                url: url.to_string(),
                message: format!("HTTP {}", code),
            }),
            (FetchOutcome::TransportError { message }, _) => Err(SweeperError::Discovery {
                url: url.to_string(),
                message,
            }),
            (FetchOutcome::Timeout, _) => Err(SweeperError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    async fn request(&self, url: &str, capture_body: bool) -> (FetchOutcome, Option<String>) {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return (classify_error(&e), None),
        };

        let status = response.status();
        let final_url = response.url().to_string();
        let outcome = FetchOutcome::Status {
            code: status.as_u16(),
            final_url,
        };

        if !capture_body || status != StatusCode::OK {
            return (outcome, None);
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_textual(&content_type) {
            tracing::debug!("Not scanning {} ({})", url, content_type);
            return (outcome, None);
        }

        match response.text().await {
            Ok(body) => (outcome, Some(body)),
            Err(e) if e.is_timeout() => (FetchOutcome::Timeout, None),
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", url, e);
                (outcome, None)
            }
        }
    }
}

/// Returns true if a Content-Type is worth scanning for links
///
/// A missing Content-Type is scanned.
fn is_textual(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
        || content_type.contains("json")
        || content_type.contains("javascript")
}

/// Maps a transport-level error to an outcome
fn classify_error(error: &reqwest::Error) -> FetchOutcome {
    if error.is_timeout() {
        return FetchOutcome::Timeout;
    }

    let message = if error.is_builder() {
        format!("Invalid URL: {}", error)
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", root_cause(error))
    } else {
        error.to_string()
    };

    FetchOutcome::TransportError { message }
}

/// Walks the source chain down to the innermost error message
fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_client_accepting_invalid_certs() {
        let config = HttpConfig {
            accept_invalid_certs: true,
            ..HttpConfig::default()
        };
        assert!(build_http_client(&config, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("text/html; charset=utf-8"));
        assert!(is_textual("application/xhtml+xml"));
        assert!(is_textual(""));
        assert!(!is_textual("image/png"));
        assert!(!is_textual("application/octet-stream"));
    }

    #[test]
    fn test_outcome_is_ok() {
        let ok = FetchOutcome::Status {
            code: 200,
            final_url: "http://example.test/".to_string(),
        };
        let not_found = FetchOutcome::Status {
            code: 404,
            final_url: "http://example.test/".to_string(),
        };
        assert!(ok.is_ok());
        assert!(!not_found.is_ok());
        assert!(!FetchOutcome::Timeout.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let client = build_http_client(&HttpConfig::default(), Duration::from_secs(1)).unwrap();
        let gate = FetchGate::new(client, 4, Duration::from_secs(1));

        let result = gate
            .fetch(Link::new("http://", "http://example.test/"), false)
            .await;

        assert!(matches!(result.outcome, FetchOutcome::TransportError { .. }));
        assert_eq!(result.parent, "http://example.test/");
    }

    #[tokio::test]
    async fn test_refused_connection_does_not_abort_batch() {
        let client = build_http_client(&HttpConfig::default(), Duration::from_secs(2)).unwrap();
        let gate = FetchGate::new(client, 4, Duration::from_secs(2));

        // Port 9 (discard) on localhost is almost never listening
        let links = vec![
            Link::new("http://127.0.0.1:9/a", "p"),
            Link::new("http://127.0.0.1:9/b", "p"),
            Link::new("not a url", "p"),
        ];
        let results = gate.fetch_all(links).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.outcome.is_ok()));
        assert!(gate.peak_in_flight() <= 4);
    }
}
