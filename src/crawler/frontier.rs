//! Deduplicated store of discovered links
//!
//! The frontier keys links by URL alone. The first parent recorded for a URL
//! is the one blamed in the report, even if later pages link to it too.

use std::collections::HashMap;

/// A discovered link and the page that referenced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub url: String,
    pub parent: String,
}

impl Link {
    pub fn new(url: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent: parent.into(),
        }
    }
}

/// Insertion-ordered, URL-deduplicated link store
#[derive(Debug, Default)]
pub struct Frontier {
    /// url -> index into `links`
    index: HashMap<String, usize>,

    /// Every known link in insertion order
    links: Vec<Link>,

    /// Position of the first link not yet handed out by `pending`
    drained: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not known and has been inserted
    /// * `false` - The URL is already known; the stored parent is kept
    pub fn add(&mut self, link: Link) -> bool {
        if self.index.contains_key(&link.url) {
            return false;
        }

        self.index.insert(link.url.clone(), self.links.len());
        self.links.push(link);
        true
    }

    /// Adds every link, returning how many were new
    pub fn extend<I: IntoIterator<Item = Link>>(&mut self, links: I) -> usize {
        links
            .into_iter()
            .map(|l| self.add(l))
            .filter(|&added| added)
            .count()
    }

    /// Returns the links added since the last call, in insertion order
    pub fn pending(&mut self) -> Vec<Link> {
        let batch = self.links[self.drained..].to_vec();
        self.drained = self.links.len();
        batch
    }

    /// Returns true if links have been added since the last drain
    pub fn has_pending(&self) -> bool {
        self.drained < self.links.len()
    }

    /// Returns every known link in insertion order
    pub fn all(&self) -> &[Link] {
        &self.links
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
