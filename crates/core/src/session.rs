//! Authenticated portal session lifecycle.

use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::page::{PageDriver, PageError, PageResult};
use crate::types::Credentials;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Login did not succeed within the retry budget. Fatal for the run;
    /// there is no point continuing unauthenticated.
    #[error("authentication failed after {attempts} attempts")]
    AuthFailed { attempts: u32 },
}

/// Login state; transitions only through `login` and `invalidate`.
#[derive(Debug, Clone, Copy, Default)]
struct SessionState {
    logged_in: bool,
    attempts: u32,
}

/// One authenticated page against the portal, reused for every lookup.
///
/// Owns the single shared page. Not meant for concurrent lookups: the
/// portal has one search box per page and interleaved use would corrupt
/// in-flight DOM state.
pub struct BrowserSession<P: PageDriver> {
    page: P,
    config: SyncConfig,
    credentials: Credentials,
    state: Mutex<SessionState>,
}

impl<P: PageDriver> BrowserSession<P> {
    pub fn new(page: P, config: SyncConfig, credentials: Credentials) -> Self {
        Self {
            page,
            config,
            credentials,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.lock().unwrap().logged_in
    }

    /// Total login attempts spent so far, across all `login` calls.
    pub fn login_attempts(&self) -> u32 {
        self.state.lock().unwrap().attempts
    }

    /// Drops the logged-in flag so the next [`ensure_ready`](Self::ensure_ready)
    /// logs in again. Hook for consumers detecting silent session expiry.
    pub fn invalidate(&self) {
        self.state.lock().unwrap().logged_in = false;
    }

    /// Logs in, retrying failed attempts within the configured budget.
    ///
    /// Each attempt starts by navigating to the login page, which doubles
    /// as the reload between failed attempts. A page error mid-flow counts
    /// as a failed attempt, not a crash.
    pub async fn login(&self) -> Result<(), SessionError> {
        let policy = self.config.login_retry;
        let (outcome, attempts) = policy
            .run(|| self.attempt_login(), |r: &PageResult<()>| r.is_err())
            .await;

        {
            let mut state = self.state.lock().unwrap();
            state.attempts += attempts;
        }

        match outcome {
            Ok(()) => {
                self.state.lock().unwrap().logged_in = true;
                info!(target = "stocksync", attempts, "login successful");
                Ok(())
            }
            Err(err) => {
                warn!(target = "stocksync", attempts, error = %err, "login exhausted retries");
                Err(SessionError::AuthFailed { attempts })
            }
        }
    }

    /// No-op when logged in; otherwise runs the full login flow.
    pub async fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.is_logged_in() {
            return Ok(());
        }
        self.login().await
    }

    /// Releases the page for shutdown by the owning process.
    pub fn into_page(self) -> P {
        self.page
    }

    async fn attempt_login(&self) -> PageResult<()> {
        let sel = &self.config.selectors;
        debug!(target = "stocksync", url = %self.config.login_url, "logging in...");

        self.page.navigate(&self.config.login_url).await?;
        self.page
            .wait_for_selector(&sel.username_input, self.config.result_timeout)
            .await?;
        self.page
            .type_text(&sel.username_input, &self.credentials.email)
            .await?;
        self.page
            .wait_for_selector(&sel.password_input, self.config.result_timeout)
            .await?;
        self.page
            .type_text(&sel.password_input, &self.credentials.password)
            .await?;
        self.page.click(&sel.login_button).await?;

        if !self.config.settle.is_zero() {
            tokio::time::sleep(self.config.settle).await;
        }

        if self.page.element_exists(&sel.login_failure_banner).await? {
            warn!(target = "stocksync", "credentials rejected by portal");
            return Err(PageError::Other("login rejected: failure banner present".into()));
        }

        Ok(())
    }
}
