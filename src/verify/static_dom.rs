//! Markup-based visibility oracle
//!
//! Fetches the parent page as served and looks for anchors whose `href`
//! contains the path segment and that sit under no hidden element. An element
//! is hidden if its inline `style` sets `display:none` or it carries the class
//! `hidden`. Styles from stylesheets and scripts are not evaluated; use the
//! browser oracle for that.

use crate::crawler::FetchGate;
use crate::verify::VisibilityOracle;
use crate::SweeperError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

/// Oracle that inspects the served HTML
pub struct StaticDomOracle {
    gate: FetchGate,
}

impl StaticDomOracle {
    pub fn new(gate: FetchGate) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl VisibilityOracle for StaticDomOracle {
    async fn count_visible_anchors(
        &self,
        parent_url: &str,
        path_segment: &str,
    ) -> Result<usize, SweeperError> {
        let html = self
            .gate
            .fetch_text(parent_url)
            .await
            .map_err(|e| SweeperError::Verification {
                url: parent_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(count_visible_anchors_in(&html, path_segment))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Counts visible anchors in an HTML document whose `href` contains `path_segment`
///
/// # Example
///
/// ```
/// use link_sweeper::verify::count_visible_anchors_in;
///
/// let html = r#"<div><a href="/b">B</a></div>
///               <div style="display: none"><a href="/b">B</a></div>"#;
/// assert_eq!(count_visible_anchors_in(html, "b"), 1);
/// ```
pub fn count_visible_anchors_in(html: &str, path_segment: &str) -> usize {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return 0,
    };

    document
        .select(&selector)
        .filter(|anchor| {
            anchor
                .value()
                .attr("href")
                .is_some_and(|href| href.contains(path_segment))
        })
        .filter(|anchor| {
            !is_hidden(anchor)
                && !anchor
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|e| is_hidden(&e))
        })
        .count()
}

fn is_hidden(element: &ElementRef) -> bool {
    let value = element.value();

    if value.classes().any(|class| class == "hidden") {
        return true;
    }

    value.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none")
    })
}
