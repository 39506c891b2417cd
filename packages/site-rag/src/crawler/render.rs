//! Headless Chromium renderer.
//!
//! Each page is rendered by a short-lived `chromium --headless --dump-dom`
//! child process. `--virtual-time-budget` lets client-side scripts run for
//! the settle delay before the DOM is serialized. The process is killed if
//! it outlives the render timeout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::{PageRenderer, RenderedPage};

/// Default wall-clock limit for one render.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(20);

/// Default time allowed for scripts to settle before the DOM is read.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(1000);

/// Binary names probed on `PATH`, in order.
const CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Renders pages with a headless Chromium child process.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    binary: PathBuf,
    timeout: Duration,
    settle: Duration,
}

impl ChromeRenderer {
    /// Use an explicit browser binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_RENDER_TIMEOUT,
            settle: DEFAULT_SETTLE,
        }
    }

    /// Find a Chromium-family browser on `PATH`.
    pub fn detect() -> CrawlResult<Self> {
        CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::new)
            .ok_or_else(|| {
                CrawlError::Render(format!(
                    "no headless browser found on PATH (tried {})",
                    CANDIDATES.join(", ")
                ))
            })
    }

    /// Set the render timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the settle delay.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, url: &Url) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--hide-scrollbars")
            .arg("--mute-audio")
            .arg(format!(
                "--virtual-time-budget={}",
                self.settle.as_millis()
            ))
            .arg("--dump-dom")
            .arg(url.as_str())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &Url) -> CrawlResult<RenderedPage> {
        debug!(url = %url, "Rendering page");

        let output = tokio::time::timeout(self.timeout, self.command(url).output())
            .await
            .map_err(|_| CrawlError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| CrawlError::Render(format!("failed to run browser: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CrawlError::Render(format!(
                "browser exited with {} for {}: {}",
                output.status,
                url,
                stderr.trim()
            )));
        }

        // --dump-dom does not report redirects
        // --dump-dom does not expose the post-redirect URL
        Ok(RenderedPage::new(
            url.clone(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }

    async fn ensure_ready(&self) -> CrawlResult<()> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .arg("--version")
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| CrawlError::Render("browser did not start in time".into()))?
        .map_err(|e| {
            CrawlError::Render(format!("cannot start {}: {}", self.binary.display(), e))
        })?;

        if !output.status.success() {
            return Err(CrawlError::Render(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }

        info!(
            browser = %String::from_utf8_lossy(&output.stdout).trim(),
            "Headless browser ready"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "chromium"
    }
}
