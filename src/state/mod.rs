//! State tracking for a crawl run
//!
//! This module contains:
//! - The crawl phase state machine
//! - Per-run counters owned by the coordinator
//! - The progress side-channel

mod crawl_state;
mod phase;
mod progress;

pub use crawl_state::CrawlState;
pub use phase::CrawlPhase;
pub use progress::{CrawlProgress, ProgressReporter};
