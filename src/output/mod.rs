//! Output module for crawl reports
//!
//! This module handles:
//! - Aggregating failures by kind
//! - Rendering the HTML report and the plain-text results
//! - Writing the report files at the end of a run
//! - Run statistics

mod html;
mod report;
pub mod stats;
mod text;
mod traits;

pub use html::HtmlReport;
pub use report::{FailureKind, FailureRecord, Report};
pub use stats::{print_statistics, CrawlStatistics};
pub use text::{render_link_list, TextReport};
pub use traits::{FailureSink, OutputError, OutputResult, ReportRenderer};

use crate::config::Config;
use crate::crawler::CrawlOutcome;
use std::path::{Path, PathBuf};

/// Paths of the files written for a run
#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub results: PathBuf,
    pub links: PathBuf,
    pub html: PathBuf,
}

/// Writes the results file, the tested-links file and the HTML report
///
/// # Arguments
///
/// * `outcome` - The finished run
/// * `config` - Supplies the output paths and the seed URL
///
/// # Returns
///
/// * `Ok(WrittenReports)` - Where each file went
/// * `Err(OutputError)` - A file could not be written
pub fn write_reports(outcome: &CrawlOutcome, config: &Config) -> OutputResult<WrittenReports> {
    let written = WrittenReports {
        results: PathBuf::from(&config.output.results_file),
        links: PathBuf::from(&config.output.links_file),
        html: PathBuf::from(config.html_report_path()),
    };

    write_file(&written.results, &TextReport.render(&outcome.report))?;
    write_file(&written.links, &render_link_list(&outcome.tested))?;

    let html = HtmlReport::new(config.crawl.initial_url.as_str());
    write_file(&written.html, &html.render(&outcome.report))?;

    tracing::info!(
        "Wrote {}, {} and {}",
        written.results.display(),
        written.links.display(),
        written.html.display()
    );

    Ok(written)
}

/// Writes a file, creating missing parent directories
fn write_file(path: &Path, content: &str) -> OutputResult<()> {
    let to_error = |source| OutputError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }

    std::fs::write(path, content).map_err(to_error)
}
