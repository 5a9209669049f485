//! Rendered-DOM snapshots for pages that build their listing in JavaScript

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::config::RenderConfig;
use crate::errors::{SourceError, SourceResult};

/// Produces the DOM of a page after scripts have run
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> SourceResult<String>;
}

/// Runs a headless browser that prints the final DOM on stdout
/// (Chromium's `--dump-dom`).
pub struct HeadlessBrowserRenderer {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl HeadlessBrowserRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl PageRenderer for HeadlessBrowserRenderer {
    async fn render(&self, url: &str) -> SourceResult<String> {
        debug!("Rendering {} with {} {:?}", url, self.command, self.args);

        let child = Command::new(&self.command)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SourceError::render(format!("Failed to start '{}': {e}", self.command)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                SourceError::render(format!(
                    "'{}' did not finish within {}s",
                    self.command,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| SourceError::render(format!("Failed to read renderer output: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::render(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        if dom.trim().is_empty() {
            return Err(SourceError::render("Renderer produced an empty document"));
        }

        debug!("Rendered DOM is {} bytes", dom.len());
        Ok(dom)
    }
}
