//! Progress side-channel
//!
//! The coordinator publishes a snapshot after every resolved link. Readers
//! (the CLI progress bar) only ever see the latest value.

use tokio::sync::watch;

/// Snapshot of crawl progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Current round
    pub round: u32,

    /// Links resolved so far; never decreases
    pub processed: usize,

    /// Current frontier size
    pub total: usize,

    /// Failures reported so far
    pub failures: usize,
}

/// Publishing half of the progress channel
#[derive(Debug)]
pub struct ProgressReporter {
    sender: watch::Sender<CrawlProgress>,
}

impl ProgressReporter {
    /// Creates a reporter and the receiver that observes it
    pub fn channel() -> (Self, watch::Receiver<CrawlProgress>) {
        let (sender, receiver) = watch::channel(CrawlProgress::default());
        (Self { sender }, receiver)
    }

    /// Publishes a new snapshot
    ///
    /// A `processed` value lower than the last published one is raised to it.
    pub fn publish(&self, progress: CrawlProgress) {
        self.sender.send_modify(|current| {
            let processed = progress.processed.max(current.processed);
            *current = CrawlProgress {
                processed,
                total: progress.total.max(processed),
                ..progress
            };
        });
    }

    /// Returns the last published snapshot
    pub fn current(&self) -> CrawlProgress {
        *self.sender.borrow()
    }
}
