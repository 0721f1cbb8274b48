//! Visibility verification for candidate failures
//!
//! A failing link is only worth reporting if a user can actually see it on
//! the page that references it. The verifier asks an oracle how many visible
//! anchors on the parent page point at the child's trailing path segment.
//!
//! The check fails open: if the oracle errors or runs out of time the link is
//! treated as visible, so a broken verifier never hides a real failure.

#[cfg(feature = "browser")]
mod browser;
mod static_dom;

#[cfg(feature = "browser")]
pub use browser::BrowserOracle;
pub use static_dom::{count_visible_anchors_in, StaticDomOracle};

use crate::config::{Config, VerifyBackend};
use crate::crawler::FetchGate;
use crate::url::trailing_segment;
use crate::SweeperError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Renders a page and counts visible anchors pointing at a path segment
#[async_trait]
pub trait VisibilityOracle: Send + Sync {
    /// Counts displayed anchors on `parent_url` whose link target contains
    /// `path_segment`
    async fn count_visible_anchors(
        &self,
        parent_url: &str,
        path_segment: &str,
    ) -> Result<usize, SweeperError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Fail-open wrapper around an oracle
#[derive(Clone)]
pub struct VisibilityVerifier {
    oracle: Arc<dyn VisibilityOracle>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl VisibilityVerifier {
    /// Creates a verifier
    ///
    /// # Arguments
    ///
    /// * `oracle` - Backend that renders the parent page
    /// * `timeout` - Time budget for one verification
    /// * `max_concurrent` - Maximum verifications running at once
    pub fn new(oracle: Arc<dyn VisibilityOracle>, timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            oracle,
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Returns true if `child_url` is visible on `parent_url`
    ///
    /// Any oracle failure or timeout yields `true`.
    pub async fn is_visible(&self, parent_url: &str, child_url: &str) -> bool {
        let segment = match trailing_segment(child_url) {
            Some(segment) => segment,
            None => {
                tracing::debug!("No path segment in {}, assuming visible", child_url);
                return true;
            }
        };

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return true,
        };

        let check = self.oracle.count_visible_anchors(parent_url, &segment);
        match tokio::time::timeout(self.timeout, check).await {
            Ok(Ok(count)) => {
                tracing::debug!(
                    "{} oracle: {} visible anchors for '{}' on {}",
                    self.oracle.name(),
                    count,
                    segment,
                    parent_url
                );
                count > 0
            }
            Ok(Err(e)) => {
                tracing::warn!("{}; assuming {} is visible", e, child_url);
                true
            }
            Err(_) => {
                tracing::warn!(
                    "Visibility check of {} on {} timed out after {:?}; assuming visible",
                    child_url,
                    parent_url,
                    self.timeout
                );
                true
            }
        }
    }
}

/// Builds the verifier selected by the configuration
///
/// Returns `None` when verification is disabled.
pub fn build_verifier(config: &Config, gate: &FetchGate) -> Option<VisibilityVerifier> {
    if !config.verify.enabled {
        return None;
    }

    let oracle: Arc<dyn VisibilityOracle> = match config.verify.backend {
        VerifyBackend::Static => Arc::new(StaticDomOracle::new(gate.clone())),
        VerifyBackend::Browser => browser_oracle(config, gate),
    };

    Some(VisibilityVerifier::new(
        oracle,
        Duration::from_secs(config.verify.timeout),
        config.verify.max_concurrent,
    ))
}

#[cfg(feature = "browser")]
fn browser_oracle(config: &Config, _gate: &FetchGate) -> Arc<dyn VisibilityOracle> {
    Arc::new(BrowserOracle::new(
        config.http.user_agent.clone(),
        config.http.accept_invalid_certs,
    ))
}

#[cfg(not(feature = "browser"))]
fn browser_oracle(_config: &Config, gate: &FetchGate) -> Arc<dyn VisibilityOracle> {
    tracing::warn!("Built without the `browser` feature; using the static visibility check");
    Arc::new(StaticDomOracle::new(gate.clone()))
}
