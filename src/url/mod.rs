//! URL handling module for Link-Sweeper
//!
//! This module provides substring filtering with configurable case sensitivity,
//! the trailing-segment helper used by the visibility check, and link
//! classification against the configured scope and filter lists.

mod matcher;
mod segment;

use crate::config::Config;

// Re-export main functions
pub use matcher::SubstringMatcher;
pub use segment::trailing_segment;

/// How the crawl loop treats a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Matches an exclude pattern - never fetched, expanded or reported
    Excluded,
    /// Within the crawl scope - fetched, and expanded on success
    InScope,
    /// Outside the crawl scope - fetched and reported, never expanded
    OutOfScope,
}

impl LinkClass {
    /// Returns true if the link should be fetched
    pub fn should_fetch(&self) -> bool {
        !matches!(self, Self::Excluded)
    }

    /// Returns true if a successful page should be scanned for more links
    pub fn should_expand(&self) -> bool {
        matches!(self, Self::InScope)
    }
}

/// Scope and filter lists applied to discovered links
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    scope: SubstringMatcher,
    ignore: SubstringMatcher,
    exclude: SubstringMatcher,
}

impl LinkFilter {
    /// Creates a filter
    ///
    /// An empty `scope` places every link in scope.
    pub fn new(
        scope: &str,
        ignore: Vec<String>,
        exclude: Vec<String>,
        case_sensitive: bool,
    ) -> Self {
        Self {
            scope: SubstringMatcher::new(vec![scope.to_string()], case_sensitive),
            ignore: SubstringMatcher::new(ignore, case_sensitive),
            exclude: SubstringMatcher::new(exclude, case_sensitive),
        }
    }

    /// Builds the filter from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.crawl.domain_filter(),
            config.filters.ignore_urls.as_slice().to_vec(),
            config.filters.exclude_urls.as_slice().to_vec(),
            config.filters.case_sensitive,
        )
    }

    /// Returns true if an extracted candidate must be dropped
    pub fn is_ignored(&self, candidate: &str) -> bool {
        self.ignore.matches(candidate)
    }

    /// Returns true if the URL is always treated as acceptable
    pub fn is_excluded(&self, url: &str) -> bool {
        self.exclude.matches(url)
    }

    /// Returns true if the URL lies within the crawl scope
    pub fn in_scope(&self, url: &str) -> bool {
        self.scope.is_empty() || self.scope.matches(url)
    }

    /// Classifies a URL
    ///
    /// Exclusion takes priority over scope.
    pub fn classify(&self, url: &str) -> LinkClass {
        if self.is_excluded(url) {
            LinkClass::Excluded
        } else if self.in_scope(url) {
            LinkClass::InScope
        } else {
            LinkClass::OutOfScope
        }
    }
}
