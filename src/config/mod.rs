//! Configuration module for Link-Sweeper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key except `crawl.initial-url` has a default.
//!
//! # Example
//!
//! ```no_run
//! use link_sweeper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweeper.toml")).unwrap();
//! println!("Crawler will follow {} hops", config.crawl.max_recursion);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FilterConfig, HttpConfig, OutputConfig, PatternList, VerifyBackend,
    VerifyConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
