//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives a run round by round:
//! - Discovering the seed page and taking each round's pending links
//! - Fetching sub-batches through the Fetch Gate with an adaptive width
//! - Classifying outcomes and expanding successful in-scope pages
//! - Verifying candidate failures before they reach the report
//!
//! The coordinator is the single owner of the Frontier, the Report and the
//! run counters. Tasks only ever return values; all writes happen here after
//! fan-in.

use crate::config::Config;
use crate::crawler::extractor::{discover, extract_links};
use crate::crawler::fetcher::{FetchGate, FetchOutcome, FetchResult};
use crate::crawler::frontier::{Frontier, Link};
use crate::crawler::scheduler::Scheduler;
use crate::output::{FailureRecord, FailureSink, Report};
use crate::state::{CrawlPhase, CrawlProgress, CrawlState, ProgressReporter};
use crate::url::LinkFilter;
use crate::verify::{build_verifier, VisibilityVerifier};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Everything a finished run produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Reported failures grouped by kind
    pub report: Report,

    /// Every fetched URL, in the order it was scheduled
    pub tested: Vec<String>,

    /// Number of distinct links discovered
    pub discovered: usize,

    /// Final counters and phase
    pub state: CrawlState,

    /// Highest number of simultaneous fetches observed
    pub peak_in_flight: usize,

    /// Wall-clock run time
    pub duration: Duration,
}

impl CrawlOutcome {
    /// Number of rounds that were started
    pub fn rounds(&self) -> u32 {
        self.state.round
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    gate: FetchGate,
    filter: LinkFilter,
    frontier: Frontier,
    scheduler: Scheduler,
    verifier: Option<VisibilityVerifier>,
    report: Report,
    state: CrawlState,
    progress: Option<ProgressReporter>,
    tested: Vec<String>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SweeperError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let gate = FetchGate::from_config(&config)?;
        let filter = LinkFilter::from_config(&config);
        let verifier = build_verifier(&config, &gate);
        let scheduler = Scheduler::new(config.crawl.max_threads_count, config.crawl.limit);

        Ok(Self {
            config: Arc::new(config),
            gate,
            filter,
            frontier: Frontier::new(),
            scheduler,
            verifier,
            report: Report::new(),
            state: CrawlState::new(),
            progress: None,
            tested: Vec::new(),
        })
    }

    /// Attaches a progress reporter
    pub fn with_progress(mut self, reporter: ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Replaces the verifier built from the configuration
    ///
    /// `None` reports every failure without a visibility check.
    pub fn with_verifier(mut self, verifier: Option<VisibilityVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Returns the Fetch Gate used by this run
    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    /// Runs the crawl to completion
    ///
    /// Individual link failures never end the run; they end up in the report.
    pub async fn run(mut self) -> Result<CrawlOutcome> {
        let seed = self.config.crawl.initial_url.clone();
        let max_recursion = self.config.crawl.max_recursion;

        tracing::info!(
            "Starting crawl of {} (max recursion {}, max threads {}, verifier: {})",
            seed,
            max_recursion,
            self.config.crawl.max_threads_count,
            if self.verifier.is_some() { "on" } else { "off" }
        );

        let seed_links = discover(&self.gate, &seed, &self.filter).await;
        let added = self.frontier.extend(seed_links);
        tracing::info!("Seed page yielded {} links", added);
        self.publish_progress();

        loop {
            if self.state.round > max_recursion {
                tracing::info!("Hop limit of {} reached", max_recursion);
                break;
            }

            if !self.frontier.has_pending() {
                tracing::info!("No new links found, crawl complete");
                break;
            }

            let batch = self.frontier.pending();
            if self.scheduler.is_exhausted() {
                tracing::info!(
                    "Request limit reached, skipping {} pending links",
                    batch.len()
                );
                self.state.skipped += batch.len();
                self.state.processed += batch.len();
                break;
            }

            let batch_size = batch.len();
            let fetchable = self.drop_excluded(batch);
            let excluded = batch_size - fetchable.len();

            let (mut plan, overflow) = self.scheduler.plan_round(fetchable);
            self.state.skipped += overflow.len();
            self.state.processed += excluded + overflow.len();

            if plan.remaining() == 0 {
                tracing::info!("Nothing left to fetch in round {}", self.state.round);
                break;
            }

            tracing::info!(
                "Round {}: fetching {} links ({} excluded, {} over limit)",
                self.state.round,
                plan.total(),
                excluded,
                overflow.len()
            );

            while let Some(sub_batch) = plan.next_sub_batch() {
                self.process_sub_batch(sub_batch).await?;
            }

            self.state.round += 1;
            self.state.transition(CrawlPhase::Discovering)?;
        }

        self.state.transition(CrawlPhase::Done)?;
        self.publish_progress();

        let duration = self.state.started_at.elapsed();
        tracing::info!(
            "Crawl finished: {} links fetched in {} rounds, {} failures reported, {} suppressed ({:.1}s)",
            self.state.fetched,
            self.state.round,
            self.report.total(),
            self.state.suppressed,
            duration.as_secs_f64()
        );

        Ok(CrawlOutcome {
            discovered: self.frontier.len(),
            peak_in_flight: self.gate.peak_in_flight(),
            report: self.report,
            tested: self.tested,
            state: self.state,
            duration,
        })
    }

    /// Removes links matching an exclude pattern from a batch
    fn drop_excluded(&mut self, batch: Vec<Link>) -> Vec<Link> {
        let (excluded, fetchable): (Vec<Link>, Vec<Link>) = batch
            .into_iter()
            .partition(|link| !self.filter.classify(&link.url).should_fetch());

        for link in &excluded {
            tracing::debug!("Excluded: {}", link.url);
        }
        self.state.excluded += excluded.len();

        fetchable
    }

    /// Fetches, classifies and (if needed) verifies one sub-batch
    async fn process_sub_batch(&mut self, links: Vec<Link>) -> Result<()> {
        self.state.transition(CrawlPhase::Fetching)?;

        let requests: Vec<(Link, bool)> = links
            .into_iter()
            .map(|link| {
                self.tested.push(link.url.clone());
                let expand = self.filter.classify(&link.url).should_expand();
                (link, expand)
            })
            .collect();

        let results = self.gate.fetch_batch(requests).await;
        self.state.fetched += results.len();

        self.state.transition(CrawlPhase::Classifying)?;

        let mut candidates = Vec::new();
        for result in results {
            self.state.processed += 1;

            match &result.outcome {
                FetchOutcome::Status { code: 200, .. } => self.expand(&result),
                FetchOutcome::Status { .. } if self.verifier.is_some() => candidates.push(result),
                _ => self.record_failure(&result),
            }
        }

        if !candidates.is_empty() {
            self.state.transition(CrawlPhase::Verifying)?;

            for (result, visible) in self.verify_candidates(candidates).await {
                if visible {
                    self.record_failure(&result);
                } else {
                    tracing::debug!("Suppressed hidden link {} on {}", result.url, result.parent);
                    self.state.suppressed += 1;
                }
            }
        }

        self.state.transition(CrawlPhase::Aggregating)?;
        self.publish_progress();

        Ok(())
    }

    /// Scans a successful page for new links
    ///
    /// Only in-scope pages carry a body; everything else is a no-op.
    fn expand(&mut self, result: &FetchResult) {
        let Some(body) = &result.body else {
            return;
        };

        let links = extract_links(body, &result.url, &self.filter);
        let found = links.len();
        let added = self.frontier.extend(links);
        self.state.expanded += 1;

        tracing::debug!("{}: {} links, {} new", result.url, found, added);
    }

    /// Runs the visibility check for every candidate concurrently
    ///
    /// A candidate whose check did not produce a verdict counts as visible.
    async fn verify_candidates(&self, candidates: Vec<FetchResult>) -> Vec<(FetchResult, bool)> {
        let Some(verifier) = &self.verifier else {
            return candidates.into_iter().map(|c| (c, true)).collect();
        };

        let mut verdicts = vec![true; candidates.len()];
        let mut tasks = JoinSet::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let verifier = verifier.clone();
            let parent = candidate.parent.clone();
            let url = candidate.url.clone();
            tasks.spawn(async move { (i, verifier.is_visible(&parent, &url).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, visible)) => verdicts[i] = visible,
                Err(e) => tracing::error!("Verification task failed: {}", e),
            }
        }

        candidates.into_iter().zip(verdicts).collect()
    }

    fn record_failure(&mut self, result: &FetchResult) {
        let Some(record) = FailureRecord::from_outcome(&result.url, &result.parent, &result.outcome)
        else {
            return;
        };

        tracing::info!("{} {} (parent page: {})", record.kind, record.url, record.parent);
        self.report.record(record);
    }

    fn publish_progress(&self) {
        if let Some(progress) = &self.progress {
            progress.publish(CrawlProgress {
                round: self.state.round,
                processed: self.state.processed,
                total: self.frontier.len(),
                failures: self.report.total(),
            });
        }
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client, filters and verifier from the configuration
/// 2. Discover the links on the seed page
/// 3. Fetch, classify and expand round by round until the frontier is
///    exhausted or the hop limit is reached
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The run completed; the report may be empty
/// * `Err(SweeperError)` - The run could not start
///
/// # Example
///
/// ```no_run
/// use link_sweeper::config::load_config;
/// use link_sweeper::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(config).await?;
/// println!("{} failures", outcome.report.total());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlOutcome> {
    Coordinator::new(config)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::output::FailureKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(seed: &str, extra: &str) -> Config {
        parse_config(&format!(
            "[crawl]\ninitial-url = \"{}\"\ntimeout = 2\nmax-threads-count = 4\n{}",
            seed, extra
        ))
        .unwrap()
    }

    fn html(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html")
    }

    /// Serves a chain / -> /p0 -> /p1 -> ... -> /p{depth}
    async fn mount_chain(server: &MockServer, depth: usize) {
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(format!("<a href=\"{}/p0\">next</a>", base)))
            .mount(server)
            .await;

        for i in 0..depth {
            Mock::given(method("GET"))
                .and(path(format!("/p{}", i)))
                .respond_with(html(format!("<a href=\"{}/p{}\">next</a>", base, i + 1)))
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_hop_limit_bounds_rounds() {
        let server = MockServer::start().await;
        mount_chain(&server, 10).await;

        let config = create_test_config(&format!("{}/", server.uri()), "max-recursion = 2");
        let outcome = run_crawl(config).await.unwrap();

        assert_eq!(outcome.rounds(), 3);
        assert_eq!(outcome.tested.len(), 3);
        assert!(outcome.state.is_done());
        assert!(outcome.report.is_empty());
    }

    #[tokio::test]
    async fn test_stops_when_frontier_is_exhausted() {
        let server = MockServer::start().await;
        mount_chain(&server, 2).await;
        // /p2 is not mounted: wiremock answers 404

        let config = create_test_config(
            &format!("{}/", server.uri()),
            "max-recursion = 10\n[verify]\nenabled = false",
        );
        let outcome = run_crawl(config).await.unwrap();

        assert_eq!(outcome.rounds(), 3);
        let missing = outcome.report.get(FailureKind::Status(404));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].url, format!("{}/p2", server.uri()));
        assert_eq!(missing[0].parent, format!("{}/p1", server.uri()));
    }

    #[tokio::test]
    async fn test_unreachable_seed_yields_empty_report() {
        let config = create_test_config("http://127.0.0.1:9/", "");
        let outcome = run_crawl(config).await.unwrap();

        assert!(outcome.report.is_empty());
        assert!(outcome.tested.is_empty());
        assert_eq!(outcome.rounds(), 0);
    }

    #[tokio::test]
    async fn test_request_limit_skips_overflow() {
        let server = MockServer::start().await;
        let base = server.uri();
        let body: String = (0..6)
            .map(|i| format!("<a href=\"{}/page{}\">x</a>\n", base, i))
            .collect();
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(body))
            .mount(&server)
            .await;

        let config = create_test_config(
            &format!("{}/", base),
            "limit = 4\n[verify]\nenabled = false",
        );
        let outcome = run_crawl(config).await.unwrap();

        assert_eq!(outcome.state.fetched, 4);
        assert_eq!(outcome.state.skipped, 2);
        assert_eq!(outcome.report.total(), 4);
    }

    #[tokio::test]
    async fn test_spent_limit_skips_next_round() {
        let server = MockServer::start().await;
        let base = server.uri();
        let body: String = (0..6)
            .map(|i| format!("<a href=\"{}/page{}\">x</a>\n", base, i))
            .collect();
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page0"))
            .respond_with(html(format!(
                "<a href=\"{0}/deep1\">a</a> <a href=\"{0}/deep2\">b</a>",
                base
            )))
            .mount(&server)
            .await;

        let config = create_test_config(
            &format!("{}/", base),
            "limit = 4\nmax-recursion = 3\n[verify]\nenabled = false",
        );
        let outcome = run_crawl(config).await.unwrap();

        assert_eq!(outcome.state.fetched, 4);
        assert_eq!(outcome.state.skipped, 4);
        assert_eq!(outcome.discovered, 8);
        assert_eq!(outcome.rounds(), 1);
        assert!(!outcome.tested.iter().any(|url| url.contains("deep")));
    }

    #[tokio::test]
    async fn test_progress_reaches_frontier_size() {
        let server = MockServer::start().await;
        mount_chain(&server, 1).await;

        let (reporter, receiver) = ProgressReporter::channel();
        let config = create_test_config(&format!("{}/", server.uri()), "max-recursion = 5");
        let outcome = Coordinator::new(config)
            .unwrap()
            .with_progress(reporter)
            .run()
            .await
            .unwrap();

        let last = *receiver.borrow();
        assert_eq!(last.processed, outcome.discovered);
        assert_eq!(last.total, outcome.discovered);
    }
}
