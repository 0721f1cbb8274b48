//! Failure aggregation
//!
//! Failures are grouped by kind (status code, transport error or timeout).
//! Kinds keep the order they were first seen in, and records within a kind
//! keep arrival order.

use crate::crawler::FetchOutcome;
use crate::output::traits::FailureSink;
use std::collections::HashMap;
use std::fmt;

/// What went wrong with a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The server answered with a non-200 status
    Status(u16),
    /// The request failed below HTTP
    TransportError,
    /// The request exceeded the per-request timeout
    Timeout,
}

impl FailureKind {
    /// Derives the failure kind of a fetch outcome
    ///
    /// Returns `None` for a 200 response.
    pub fn from_outcome(outcome: &FetchOutcome) -> Option<Self> {
        match outcome {
            FetchOutcome::Status { code: 200, .. } => None,
            FetchOutcome::Status { code, .. } => Some(Self::Status(*code)),
            FetchOutcome::TransportError { .. } => Some(Self::TransportError),
            FetchOutcome::Timeout => Some(Self::Timeout),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{}", code),
            Self::TransportError => write!(f, "TransportError"),
            Self::Timeout => write!(f, "Timeout"),
        }
    }
}

/// A reported failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub kind: FailureKind,
    pub url: String,
    pub parent: String,
    /// Transport error message, when there is one
    pub detail: Option<String>,
}

impl FailureRecord {
    /// Builds a record from a failing fetch outcome
    ///
    /// Returns `None` for a 200 response.
    pub fn from_outcome(url: &str, parent: &str, outcome: &FetchOutcome) -> Option<Self> {
        let kind = FailureKind::from_outcome(outcome)?;
        let detail = match outcome {
            FetchOutcome::TransportError { message } => Some(message.clone()),
            _ => None,
        };

        Some(Self {
            kind,
            url: url.to_string(),
            parent: parent.to_string(),
            detail,
        })
    }
}

/// Append-only failure map for one run
#[derive(Debug, Clone, Default)]
pub struct Report {
    index: HashMap<FailureKind, usize>,
    groups: Vec<(FailureKind, Vec<FailureRecord>)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups in first-seen order
    pub fn groups(&self) -> impl Iterator<Item = (FailureKind, &[FailureRecord])> {
        self.groups
            .iter()
            .map(|(kind, records)| (*kind, records.as_slice()))
    }

    /// Records of one kind, in arrival order
    pub fn get(&self, kind: FailureKind) -> &[FailureRecord] {
        self.index
            .get(&kind)
            .map(|&i| self.groups[i].1.as_slice())
            .unwrap_or(&[])
    }

    /// Every record, grouped by kind
    pub fn records(&self) -> impl Iterator<Item = &FailureRecord> {
        self.groups.iter().flat_map(|(_, records)| records.iter())
    }

    /// Count per kind, in first-seen order
    pub fn counts(&self) -> Vec<(FailureKind, usize)> {
        self.groups
            .iter()
            .map(|(kind, records)| (*kind, records.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FailureSink for Report {
    fn record(&mut self, record: FailureRecord) {
        let slot = match self.index.get(&record.kind) {
            Some(&i) => i,
            None => {
                self.groups.push((record.kind, Vec::new()));
                self.index.insert(record.kind, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        self.groups[slot].1.push(record);
    }
}
