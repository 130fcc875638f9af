//! Per-code search and outcome classification.

use tracing::{debug, warn};

use crate::page::{PageDriver, PageResult};
use crate::session::BrowserSession;
use crate::types::AvailabilityStatus;

/// Availability label recorded when the result tile carries no label element.
pub const MISSING_LABEL: &str = "Not Available";

/// Executes one search-and-classify cycle per call against a ready session.
pub struct LookupEngine<'a, P: PageDriver> {
    session: &'a BrowserSession<P>,
}

impl<'a, P: PageDriver> LookupEngine<'a, P> {
    pub fn new(session: &'a BrowserSession<P>) -> Self {
        Self { session }
    }

    /// Runs one lookup attempt. Infallible by design: page failures and
    /// deadline overruns classify as [`AvailabilityStatus::Error`] so the
    /// caller's retry loop stays in status space.
    pub async fn lookup(&self, code: &str) -> AvailabilityStatus {
        let deadline = self.session.config().attempt_deadline;
        let attempt = self.try_lookup(code);

        let outcome = if deadline.is_zero() {
            attempt.await
        } else {
            match tokio::time::timeout(deadline, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(target = "stocksync", %code, deadline_ms = deadline.as_millis() as u64,
                        "lookup attempt exceeded deadline");
                    return AvailabilityStatus::Error;
                }
            }
        };

        match outcome {
            Ok(status) => {
                debug!(target = "stocksync", %code, ?status, "lookup classified");
                status
            }
            Err(err) => {
                warn!(target = "stocksync", %code, error = %err, "lookup attempt failed");
                AvailabilityStatus::Error
            }
        }
    }

    async fn try_lookup(&self, code: &str) -> PageResult<AvailabilityStatus> {
        let config = self.session.config();
        let sel = &config.selectors;
        let page = self.session.page();

        page.wait_for_selector(&sel.search_input, config.result_timeout)
            .await?;
        // Stale text from the previous query would corrupt this search.
        page.evaluate(&clear_input_script(&sel.search_input)).await?;
        page.type_text(&sel.search_input, code).await?;
        page.wait_for_selector(&sel.search_button, config.result_timeout)
            .await?;
        page.click(&sel.search_button).await?;

        if !config.settle.is_zero() {
            tokio::time::sleep(config.settle).await;
        }
        let pause = config.search_pause.sample();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        self.classify().await
    }

    /// Classification priority: no-result banner, then result tile, then
    /// timeout. The banner wins if the portal ever renders both.
    async fn classify(&self) -> PageResult<AvailabilityStatus> {
        let config = self.session.config();
        let sel = &config.selectors;
        let page = self.session.page();

        if page.element_exists(&sel.no_result_banner).await? {
            return Ok(AvailabilityStatus::NotFound);
        }

        match page
            .wait_for_selector(&sel.result_container, config.result_timeout)
            .await
        {
            Ok(()) => {}
            Err(err) if err.is_timeout() => {
                // The banner may have rendered while we waited for the tile.
                if page.element_exists(&sel.no_result_banner).await? {
                    return Ok(AvailabilityStatus::NotFound);
                }
                return Ok(AvailabilityStatus::NotLoaded);
            }
            Err(err) => return Err(err),
        }

        let label = page.text_content(&sel.availability_label).await?;
        Ok(AvailabilityStatus::Available(
            label
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| MISSING_LABEL.to_string()),
        ))
    }
}

fn clear_input_script(selector: &str) -> String {
    let escaped = selector.replace('\\', "\\\\").replace('\'', "\\'");
    format!("document.querySelector('{escaped}').value = ''")
}
