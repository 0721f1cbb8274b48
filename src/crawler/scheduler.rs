//! Scheduler for splitting a round into sub-batches
//!
//! This module handles:
//! - The adaptive worker count: `min(max_threads, 1 + remaining / 2)`
//! - Partitioning a round's batch into sub-batches of that size
//! - The per-run request limit

use crate::crawler::frontier::Link;
use std::collections::VecDeque;

/// Computes how many workers to run for the next sub-batch
///
/// Large backlogs ramp up towards `max_threads`; the count falls as the
/// backlog drains. Always at least 1.
///
/// # Examples
///
/// ```
/// use link_sweeper::crawler::adaptive_worker_count;
///
/// assert_eq!(adaptive_worker_count(0, 20), 1);
/// assert_eq!(adaptive_worker_count(7, 20), 4);
/// assert_eq!(adaptive_worker_count(1000, 20), 20);
/// ```
pub fn adaptive_worker_count(remaining: usize, max_threads: usize) -> usize {
    (1 + remaining / 2).min(max_threads).max(1)
}

/// The links of one round, handed out sub-batch by sub-batch
#[derive(Debug)]
pub struct RoundPlan {
    queue: VecDeque<Link>,
    max_threads: usize,
    total: usize,
}

impl RoundPlan {
    /// Takes the next sub-batch, sized by the adaptive worker count
    ///
    /// Returns `None` once the round is exhausted.
    pub fn next_sub_batch(&mut self) -> Option<Vec<Link>> {
        if self.queue.is_empty() {
            return None;
        }

        let workers = adaptive_worker_count(self.queue.len(), self.max_threads);
        let take = workers.min(self.queue.len());
        tracing::trace!(
            "Sub-batch of {} ({} remaining of {})",
            take,
            self.queue.len(),
            self.total
        );

        Some(self.queue.drain(..take).collect())
    }

    /// Links not yet handed out
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Links scheduled in this round
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Scheduler tracks the worker ceiling and the request budget for a run
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Ceiling for the adaptive worker count
    max_threads: usize,

    /// Maximum fetches per run, `None` for unlimited
    limit: Option<usize>,

    /// Fetches scheduled so far
    scheduled: usize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_threads` - Ceiling for concurrent workers per sub-batch
    /// * `limit` - Maximum fetches per run; 0 means unlimited
    pub fn new(max_threads: usize, limit: usize) -> Self {
        Self {
            max_threads: max_threads.max(1),
            limit: (limit > 0).then_some(limit),
            scheduled: 0,
        }
    }

    /// Plans a round
    ///
    /// # Returns
    ///
    /// The plan for the links within the request budget, and the links that
    /// did not fit (left unfetched).
    pub fn plan_round(&mut self, batch: Vec<Link>) -> (RoundPlan, Vec<Link>) {
        let mut batch = batch;
        let overflow = match self.limit {
            Some(limit) => {
                let budget = limit.saturating_sub(self.scheduled);
                if batch.len() > budget {
                    batch.split_off(budget)
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };

        if !overflow.is_empty() {
            tracing::info!(
                "Request limit reached: {} links will not be fetched",
                overflow.len()
            );
        }

        self.scheduled += batch.len();

        let plan = RoundPlan {
            total: batch.len(),
            queue: batch.into(),
            max_threads: self.max_threads,
        };

        (plan, overflow)
    }

    /// Returns true once the request budget is spent
    pub fn is_exhausted(&self) -> bool {
        matches!(self.limit, Some(limit) if self.scheduled >= limit)
    }

    /// Fetches scheduled so far
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }
}
