use crate::config::types::{Config, CrawlConfig, OutputConfig, VerifyConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_verify_config(&config.verify)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.initial_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid initial_url: {}", e)))?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "initial_url '{}' must use http or https",
            config.initial_url
        )));
    }

    if config.max_threads_count < 1 || config.max_threads_count > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_threads_count must be between 1 and 1000, got {}",
            config.max_threads_count
        )));
    }

    if config.concurrency_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be >= 1, got {}",
            config.concurrency_limit
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    Ok(())
}

fn validate_verify_config(config: &VerifyConfig) -> Result<(), ConfigError> {
    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "verify timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    if config.max_concurrent < 1 {
        return Err(ConfigError::Validation(format!(
            "verify max_concurrent must be >= 1, got {}",
            config.max_concurrent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_file.is_empty() {
        return Err(ConfigError::Validation(
            "results_file cannot be empty".to_string(),
        ));
    }

    if config.links_file.is_empty() {
        return Err(ConfigError::Validation(
            "links_file cannot be empty".to_string(),
        ));
    }

    if matches!(&config.html_report_name, Some(name) if name.is_empty()) {
        return Err(ConfigError::Validation(
            "html_report_name cannot be empty".to_string(),
        ));
    }

    Ok(())
}
