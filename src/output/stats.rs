//! Run statistics
//!
//! This module condenses a finished run into counters and prints them.

use crate::crawler::CrawlOutcome;
use crate::output::report::FailureKind;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Distinct links discovered
    pub discovered: usize,

    /// Links fetched over the network
    pub fetched: usize,

    /// Links matching an exclude pattern
    pub excluded: usize,

    /// Links left unfetched by the request limit
    pub skipped: usize,

    /// Pages scanned for further links
    pub expanded: usize,

    /// Failures dropped because the link was not visible
    pub suppressed: usize,

    /// Reported failures per kind, in first-seen order
    pub failures_by_kind: Vec<(FailureKind, usize)>,

    /// Rounds started
    pub rounds: u32,

    /// Highest number of simultaneous fetches
    pub peak_in_flight: usize,

    pub duration: Duration,
}

impl CrawlStatistics {
    /// Collects the statistics of a finished run
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        Self {
            discovered: outcome.discovered,
            fetched: outcome.state.fetched,
            excluded: outcome.state.excluded,
            skipped: outcome.state.skipped,
            expanded: outcome.state.expanded,
            suppressed: outcome.state.suppressed,
            failures_by_kind: outcome.report.counts(),
            rounds: outcome.rounds(),
            peak_in_flight: outcome.peak_in_flight,
            duration: outcome.duration,
        }
    }

    /// Total reported failures
    pub fn total_failures(&self) -> usize {
        self.failures_by_kind.iter().map(|(_, count)| count).sum()
    }

    /// Share of fetched links that were reported, in percent
    pub fn failure_rate(&self) -> f64 {
        if self.fetched == 0 {
            return 0.0;
        }
        (self.total_failures() as f64 / self.fetched as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Links discovered: {}", stats.discovered);
    println!("  Links fetched: {}", stats.fetched);
    println!("  Pages expanded: {}", stats.expanded);
    println!("  Excluded: {}", stats.excluded);
    if stats.skipped > 0 {
        println!("  Skipped (request limit): {}", stats.skipped);
    }
    println!("  Rounds: {}", stats.rounds);
    println!("  Peak concurrent fetches: {}", stats.peak_in_flight);
    println!("  Duration: {:.1}s", stats.duration.as_secs_f64());
    println!();

    if stats.failures_by_kind.is_empty() {
        println!("No broken links found.");
    } else {
        println!("Failures by Kind:");
        for (kind, count) in &stats.failures_by_kind {
            println!("  {}: {}", kind, count);
        }
    }

    if stats.suppressed > 0 {
        println!("  Hidden (not reported): {}", stats.suppressed);
    }
    println!();

    println!(
        "Failure Rate: {:.1}% ({} / {} links)",
        stats.failure_rate(),
        stats.total_failures(),
        stats.fetched
    );
}
