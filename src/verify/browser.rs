//! Headless-browser visibility oracle
//!
//! Each verification launches its own Chromium with a throwaway profile,
//! renders the parent page and counts displayed anchors in the live DOM.
//! The browser is torn down on every exit path: `shutdown` closes it
//! gracefully, and `Drop` aborts the event handler and removes the profile
//! directory if the check errored or was cancelled part-way.

use crate::verify::VisibilityOracle;
use crate::SweeperError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

static SESSION_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Oracle that renders the parent page in headless Chromium
pub struct BrowserOracle {
    user_agent: String,
    accept_invalid_certs: bool,
}

impl BrowserOracle {
    pub fn new(user_agent: String, accept_invalid_certs: bool) -> Self {
        Self {
            user_agent,
            accept_invalid_certs,
        }
    }
}

#[async_trait]
impl VisibilityOracle for BrowserOracle {
    async fn count_visible_anchors(
        &self,
        parent_url: &str,
        path_segment: &str,
    ) -> Result<usize, SweeperError> {
        let to_error = |e: anyhow::Error| SweeperError::Verification {
            url: parent_url.to_string(),
            message: format!("{:#}", e),
        };

        let session = BrowserSession::launch(&self.user_agent, self.accept_invalid_certs)
            .await
            .map_err(to_error)?;

        let counted = session.count_anchors(parent_url, path_segment).await;
        session.shutdown().await;

        counted.map_err(to_error)
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// A running browser plus the task draining its CDP event stream
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: Option<PathBuf>,
}

impl BrowserSession {
    async fn launch(user_agent: &str, accept_invalid_certs: bool) -> Result<Self> {
        let profile_dir = std::env::temp_dir().join(format!(
            "link_sweeper_chrome_{}_{}",
            std::process::id(),
            SESSION_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&profile_dir).context("Failed to create browser profile directory")?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(30))
            .window_size(1024, 768)
            .user_data_dir(profile_dir.clone())
            .arg(format!("--user-agent={}", user_agent))
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .arg("--mute-audio");

        if accept_invalid_certs {
            builder = builder.arg("--ignore-certificate-errors");
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {:?}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            profile_dir: Some(profile_dir),
        })
    }

    async fn count_anchors(&self, parent_url: &str, path_segment: &str) -> Result<usize> {
        let page = self
            .browser
            .new_page(parent_url)
            .await
            .with_context(|| format!("Failed to open {}", parent_url))?;

        page.wait_for_navigation()
            .await
            .with_context(|| format!("Navigation to {} failed", parent_url))?;

        let evaluated = page
            .evaluate(visible_anchor_script(path_segment))
            .await
            .context("Anchor query failed");

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page: {}", e);
        }

        let count: f64 = evaluated?
            .into_value()
            .context("Anchor query returned a non-numeric value")?;

        Ok(count.max(0.0) as usize)
    }

    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Failed waiting for browser exit: {}", e);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();

        if let Some(path) = self.profile_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::debug!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

/// Script counting displayed anchors whose `href` contains the segment
fn visible_anchor_script(path_segment: &str) -> String {
    format!(
        r#"(() => {{
    const segment = {};
    return Array.from(document.querySelectorAll('a[href]'))
        .filter(a => (a.getAttribute('href') || '').includes(segment))
        .filter(a => !a.closest('.hidden'))
        .filter(a => {{
            const style = window.getComputedStyle(a);
            return style.display !== 'none'
                && style.visibility !== 'hidden'
                && a.getClientRects().length > 0;
        }})
        .length;
}})()"#,
        js_string_literal(path_segment)
    )
}

/// Quotes a string as a JavaScript literal
fn js_string_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\u{2028}' | '\u{2029}' => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
