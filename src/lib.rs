//! Link-Sweeper: a bounded-concurrency broken link crawler
//!
//! This crate discovers links reachable from a seed URL, fetches each one under
//! a global concurrency cap, and reports the URLs that fail (non-200,
//! unreachable or timed out) together with the page that referenced them.
//! Failures can optionally be checked for visibility before being reported.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;
pub mod verify;

use thiserror::Error;

/// Main error type for Link-Sweeper operations
#[derive(Debug, Error)]
pub enum SweeperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Link discovery failed for {url}: {message}")]
    Discovery { url: String, message: String },

    #[error("Visibility verification failed for {url}: {message}")]
    Verification { url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Link-Sweeper operations
pub type Result<T> = std::result::Result<T, SweeperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlOutcome, Link};
pub use output::{FailureKind, FailureRecord, Report};
pub use state::CrawlPhase;
