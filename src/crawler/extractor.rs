//! Link extraction from raw page text
//!
//! Extraction is a text scan, not an HTML parse. Every occurrence of `http`
//! followed by `s://` or `://` starts a candidate, which runs up to the first
//! of these cut markers:
//!
//! `"` ` ` `'` `&quot;` `)` `</a>` `,`
//!
//! The marker set is part of the crawler's observable behaviour: changing it
//! changes which links are found. Missed links are tolerated; bogus ones are
//! kept out by the length, suffix and ignore-list checks.

use crate::crawler::fetcher::FetchGate;
use crate::crawler::frontier::Link;
use crate::url::LinkFilter;

/// Markers that end a candidate URL
pub const CUT_MARKERS: [&str; 7] = ["\"", " ", "'", "&quot;", ")", "</a>", ","];

/// Candidates of this length or shorter are rejected
pub const MIN_LINK_LEN: usize = 8;

/// Extracts candidate links from page text
///
/// # Arguments
///
/// * `page_text` - Raw page content
/// * `parent_url` - URL of the page the text came from
/// * `filter` - Supplies the ignore list
///
/// # Returns
///
/// Accepted links in order of appearance, each with `parent = parent_url`.
/// Duplicates are kept; the frontier deduplicates.
///
/// # Example
///
/// ```
/// use link_sweeper::crawler::extract_links;
/// use link_sweeper::url::LinkFilter;
///
/// let filter = LinkFilter::new("", vec!["mailto:".to_string()], vec![], true);
/// let html = r#"<a href="http://example.test/a">A</a> <a href="https://x.test/?mailto:me">M</a>"#;
/// let links = extract_links(html, "http://example.test/", &filter);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].url, "http://example.test/a");
/// ```
pub fn extract_links(page_text: &str, parent_url: &str, filter: &LinkFilter) -> Vec<Link> {
    let mut links = Vec::new();

    for (start, _) in page_text.match_indices("http") {
        let rest = &page_text[start..];
        if !(rest[4..].starts_with("s://") || rest[4..].starts_with("://")) {
            continue;
        }

        let candidate = cut_at_marker(rest);

        if !is_acceptable(candidate, filter) {
            tracing::trace!("Rejected candidate {}", candidate);
            continue;
        }

        links.push(Link::new(candidate, parent_url));
    }

    links
}

/// Returns the shortest prefix of `piece` that ends before any cut marker
fn cut_at_marker(piece: &str) -> &str {
    let end = CUT_MARKERS
        .iter()
        .filter_map(|marker| piece.find(marker))
        .min()
        .unwrap_or(piece.len());

    &piece[..end]
}

/// Applies the length, suffix and ignore-list checks
fn is_acceptable(candidate: &str, filter: &LinkFilter) -> bool {
    candidate.len() > MIN_LINK_LEN
        && !candidate.ends_with('.')
        && !candidate.ends_with('=')
        && !filter.is_ignored(candidate)
}

/// Fetches a page and extracts its links
///
/// A failed fetch is not an error for the crawl: it is logged and the page is
/// treated as having no links.
pub async fn discover(gate: &FetchGate, parent_url: &str, filter: &LinkFilter) -> Vec<Link> {
    match gate.fetch_text(parent_url).await {
        Ok(text) => {
            let links = extract_links(&text, parent_url, filter);
            tracing::debug!("Discovered {} links on {}", links.len(), parent_url);
            links
        }
        Err(e) => {
            tracing::warn!("Failed to parse: {}", e);
            Vec::new()
        }
    }
}
