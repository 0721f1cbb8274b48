//! Crawler module for link discovery and checking
//!
//! This module contains the core crawling logic, including:
//! - Text-scan link extraction and the deduplicating frontier
//! - Bounded-concurrency fetching with a per-request timeout
//! - Sub-batch scheduling with an adaptive worker count
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use extractor::{discover, extract_links};
pub use fetcher::{build_http_client, FetchGate, FetchOutcome, FetchResult};
pub use frontier::{Frontier, Link};
pub use scheduler::{adaptive_worker_count, RoundPlan, Scheduler};

use crate::config::Config;

/// Runs a complete crawl operation
///
/// Shorthand for [`run_crawl`].
///
/// # Arguments
///
/// * `config` - The crawler configuration
pub async fn crawl(config: Config) -> crate::Result<CrawlOutcome> {
    run_crawl(config).await
}
