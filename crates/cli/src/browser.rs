//! CDP-backed page driver built on chromiumoxide.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use stocksync::{PageDriver, PageError, PageResult};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One launched Chromium instance with a single page driving the portal.
pub struct CdpPage {
    browser: Browser,
    page: chromiumoxide::Page,
    handler: JoinHandle<()>,
}

impl CdpPage {
    /// Launches Chromium and opens a blank page.
    pub async fn launch(headless: bool) -> Result<Self> {
        info!(target = "stocksync", headless, "launching browser");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(1366, 768);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|err| anyhow!("browser config: {err}"))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        // Pumps CDP websocket traffic until the browser goes away.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    debug!(target = "stocksync", "CDP event loop ended");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open page")?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Closes the browser process and stops the event pump.
    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(target = "stocksync", error = %err, "browser close failed");
        }
        self.handler.abort();
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn navigate(&self, url: &str) -> PageResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|err| PageError::Navigation {
                url: url.to_string(),
                source: err.into(),
            })?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        let start = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(PageError::Timeout {
                    ms: timeout.as_millis() as u64,
                    selector: selector.to_string(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }

    async fn type_text(&self, selector: &str, text: &str) -> PageResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PageError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        // Focus first so keystrokes land in the field.
        element
            .click()
            .await
            .map_err(|err| PageError::Other(format!("focus {selector}: {err}")))?;
        element
            .type_str(text)
            .await
            .map_err(|err| PageError::Other(format!("type into {selector}: {err}")))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> PageResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PageError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|err| PageError::Other(format!("click {selector}: {err}")))?;
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> PageResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| PageError::Eval(err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn element_exists(&self, selector: &str) -> PageResult<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn text_content(&self, selector: &str) -> PageResult<Option<String>> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(None);
        };
        let text = element
            .inner_text()
            .await
            .map_err(|err| PageError::Other(format!("inner text of {selector}: {err}")))?;
        Ok(text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
    }
}
