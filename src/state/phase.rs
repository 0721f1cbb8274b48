//! Crawl phase definitions
//!
//! One round of the crawl walks through these phases in order. A round may
//! repeat the fetch/classify/aggregate cycle once per sub-batch before the
//! next round starts discovering again.
use std::fmt;

/// Represents the current phase of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Taking the frontier's pending links as the next round's batch
    Discovering,

    /// Sub-batch fetches are in flight
    Fetching,

    /// Fetch outcomes are being sorted into success, candidate failure or acceptable
    Classifying,

    /// Candidate failures are being checked for visibility
    Verifying,

    /// Failures are recorded and new links pushed into the frontier
    Aggregating,

    /// Terminal: frontier drained, hop limit reached, or request limit hit
    Done,
}

impl CrawlPhase {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Discovering, Fetching)
                | (Discovering, Done)
                | (Fetching, Classifying)
                | (Classifying, Verifying)
                | (Classifying, Aggregating)
                | (Verifying, Aggregating)
                | (Aggregating, Fetching)
                | (Aggregating, Discovering)
                | (Aggregating, Done)
        )
    }

    /// Returns all phases in round order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Discovering,
            Self::Fetching,
            Self::Classifying,
            Self::Verifying,
            Self::Aggregating,
            Self::Done,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovering => "discovering",
            Self::Fetching => "fetching",
            Self::Classifying => "classifying",
            Self::Verifying => "verifying",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        for phase in CrawlPhase::all_phases() {
            assert_eq!(phase.is_terminal(), phase == CrawlPhase::Done);
        }
    }

    #[test]
    fn test_round_path_is_legal() {
        let path = [
            CrawlPhase::Discovering,
            CrawlPhase::Fetching,
            CrawlPhase::Classifying,
            CrawlPhase::Verifying,
            CrawlPhase::Aggregating,
            CrawlPhase::Fetching,
            CrawlPhase::Classifying,
            CrawlPhase::Aggregating,
            CrawlPhase::Discovering,
            CrawlPhase::Done,
        ];

        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!CrawlPhase::Discovering.can_transition_to(CrawlPhase::Verifying));
        assert!(!CrawlPhase::Fetching.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::Verifying.can_transition_to(CrawlPhase::Fetching));
        for phase in CrawlPhase::all_phases() {
            assert!(!CrawlPhase::Done.can_transition_to(phase));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Verifying), "verifying");
        assert_eq!(format!("{}", CrawlPhase::Done), "done");
    }
}
