use crate::state::phase::CrawlPhase;
use crate::SweeperError;
use std::time::Instant;

/// Per-run crawl state owned by the coordinator
///
/// Tracks the current phase, the round counter and the running counters
/// that feed the progress side-channel and the final statistics.
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Current phase of the crawl loop
    pub phase: CrawlPhase,

    /// Zero-based round (hop) counter
    pub round: u32,

    /// Links taken from the frontier and resolved (fetched or skipped)
    pub processed: usize,

    /// Links actually fetched over the network
    pub fetched: usize,

    /// Links never fetched because they matched an exclude pattern
    pub excluded: usize,

    /// Links left unfetched once the request limit was reached
    pub skipped: usize,

    /// Successful in-scope pages scanned for links
    pub expanded: usize,

    /// Candidate failures dropped because the link is not visible
    pub suppressed: usize,

    /// When the run started
    pub started_at: Instant,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Discovering,
            round: 0,
            processed: 0,
            fetched: 0,
            excluded: 0,
            skipped: 0,
            expanded: 0,
            suppressed: 0,
            started_at: Instant::now(),
        }
    }

    /// Moves to the next phase
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition is legal and has been applied
    /// * `Err(SweeperError::InvalidTransition)` - The phase is unchanged
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), SweeperError> {
        if !self.phase.can_transition_to(next) {
            return Err(SweeperError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Round {}: {} -> {}", self.round, self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Returns true once the run has finished
    pub fn is_done(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}
