//! Link-Sweeper main entry point
//!
//! This is the command-line interface for the Link-Sweeper broken link crawler.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use link_sweeper::config::{load_config_with_hash, Config};
use link_sweeper::crawler::Coordinator;
use link_sweeper::output::{print_statistics, write_reports, CrawlStatistics};
use link_sweeper::state::{CrawlProgress, ProgressReporter};
use std::path::PathBuf;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Link-Sweeper: a bounded-concurrency broken link crawler
///
/// Link-Sweeper crawls a site from a seed URL, checks every link it finds
/// and reports the ones that fail together with the page that references
/// them. Failures whose links are hidden on the page are left out.
#[derive(Parser, Debug)]
#[command(name = "link-sweeper")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-concurrency broken link crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Report every failure without checking whether the link is visible
    #[arg(long)]
    no_verify: bool,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.no_verify {
        config.verify.enabled = false;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        let show_progress = !(cli.quiet || cli.no_progress);
        handle_crawl(config, show_progress).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_sweeper=info,warn"),
            1 => EnvFilter::new("link_sweeper=debug,info"),
            2 => EnvFilter::new("link_sweeper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Link-Sweeper Dry Run ===\n");

    println!("Crawl:");
    println!("  Initial URL: {}", config.crawl.initial_url);
    println!("  Expand pages containing: {:?}", config.crawl.domain_filter());
    println!("  Max threads: {}", config.crawl.max_threads_count);
    println!("  Max recursion: {}", config.crawl.max_recursion);
    println!("  Timeout: {}s", config.crawl.timeout);
    println!("  Concurrency limit: {}", config.crawl.concurrency_limit);
    if config.crawl.limit > 0 {
        println!("  Request limit: {}", config.crawl.limit);
    } else {
        println!("  Request limit: none");
    }

    println!("\nFilters (case sensitive: {}):", config.filters.case_sensitive);
    println!("  Ignored ({}):", config.filters.ignore_urls.len());
    for pattern in config.filters.ignore_urls.as_slice() {
        println!("    - {}", pattern);
    }
    println!("  Excluded ({}):", config.filters.exclude_urls.len());
    for pattern in config.filters.exclude_urls.as_slice() {
        println!("    - {}", pattern);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Accept invalid certificates: {}", config.http.accept_invalid_certs);

    println!("\nVerification:");
    if config.verify.enabled {
        println!("  Backend: {:?}", config.verify.backend);
        println!("  Timeout: {}s", config.verify.timeout);
        println!("  Max concurrent: {}", config.verify.max_concurrent);
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_file);
    println!("  Tested links: {}", config.output.links_file);
    println!("  HTML report: {}", config.html_report_path());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, show_progress: bool) -> anyhow::Result<()> {
    let (reporter, receiver) = ProgressReporter::channel();
    let progress_task = show_progress.then(|| spawn_progress_bar(receiver));

    let coordinator = Coordinator::new(config.clone())
        .context("Failed to initialize crawler")?
        .with_progress(reporter);

    let outcome = coordinator.run().await;

    // The reporter is gone with the coordinator, so the bar task ends
    if let Some(task) = progress_task {
        if let Err(e) = task.await {
            tracing::debug!("Progress bar task failed: {}", e);
        }
    }

    let outcome = outcome.context("Crawl failed")?;

    let written = write_reports(&outcome, &config).context("Failed to write reports")?;

    print_statistics(&CrawlStatistics::from_outcome(&outcome));
    println!();
    println!("Results: {}", written.results.display());
    println!("Tested links: {}", written.links.display());
    println!("HTML report: {}", written.html.display());

    Ok(())
}

/// Draws a progress bar from the coordinator's progress snapshots
///
/// The task finishes once the publishing side is dropped.
fn spawn_progress_bar(mut receiver: watch::Receiver<CrawlProgress>) -> JoinHandle<()> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            let progress = *receiver.borrow_and_update();
            bar.set_length(progress.total as u64);
            bar.set_position(progress.processed as u64);
            bar.set_message(format!(
                "round {} | {} failures",
                progress.round, progress.failures
            ));
        }
        bar.finish_and_clear();
    })
}
