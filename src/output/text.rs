//! Plain-text outputs: the results file and the tested-links file

use crate::output::report::Report;
use crate::output::traits::ReportRenderer;

/// One line per failure: `<kind> <url> parent page: <parent>`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn render(&self, report: &Report) -> String {
        let mut text = String::new();
        for record in report.records() {
            text.push_str(&format!(
                "{} {} parent page: {}\n",
                record.kind, record.url, record.parent
            ));
        }
        text
    }
}

/// Renders a list of URLs, one per line
pub fn render_link_list<S: AsRef<str>>(urls: &[S]) -> String {
    let mut text = String::with_capacity(urls.iter().map(|u| u.as_ref().len() + 1).sum());
    for url in urls {
        text.push_str(url.as_ref());
        text.push('\n');
    }
    text
}
