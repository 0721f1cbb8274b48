//! HTML report generation
//!
//! One collapsible section per failure kind, each listing the failing URLs as
//! links together with the page that referenced them.

use crate::output::report::Report;
use crate::output::traits::ReportRenderer;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Renders a report as a standalone HTML document
#[derive(Debug, Clone)]
pub struct HtmlReport {
    /// Crawl seed, shown in the header
    pub seed: String,
    /// Timestamp shown in the header
    pub generated_at: DateTime<Utc>,
}

impl HtmlReport {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            generated_at: Utc::now(),
        }
    }
}

impl ReportRenderer for HtmlReport {
    fn render(&self, report: &Report) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n<title>Crawler Report</title>\n");
        html.push_str(
            "<style>\n\
             body { font-family: sans-serif; margin: 2em; }\n\
             summary { cursor: pointer; font-weight: bold; font-size: 1.1em; }\n\
             details { border-top: 1px solid #ccc; padding: 0.8em 0; }\n\
             .parent { color: #666; font-size: 0.9em; }\n\
             </style>\n",
        );
        html.push_str("</head>\n<body>\n");

        html.push_str("<h1>Crawler Report</h1>\n");
        html.push_str(&format!(
            "<p>Seed: <a href=\"{}\">{}</a><br>Generated: {}<br>Failures: {}</p>\n",
            encode_double_quoted_attribute(&self.seed),
            encode_text(&self.seed),
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.total()
        ));

        if report.is_empty() {
            html.push_str("<p>No broken links found.</p>\n");
        }

        for (kind, records) in report.groups() {
            html.push_str(&format!(
                "<details>\n<summary>{} ({})</summary>\n<ul>\n",
                encode_text(&kind.to_string()),
                records.len()
            ));

            for record in records {
                html.push_str(&format!(
                    "<li><p>URL: <a href=\"{url_attr}\">{url}</a><br>\
                     <span class=\"parent\">Parent page: <a href=\"{parent_attr}\">{parent}</a></span>",
                    url_attr = encode_double_quoted_attribute(&record.url),
                    url = encode_text(&record.url),
                    parent_attr = encode_double_quoted_attribute(&record.parent),
                    parent = encode_text(&record.parent),
                ));
                if let Some(detail) = &record.detail {
                    html.push_str(&format!("<br><span class=\"parent\">{}</span>", encode_text(detail)));
                }
                html.push_str("</p></li>\n");
            }

            html.push_str("</ul>\n</details>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}
