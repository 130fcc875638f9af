//! Engine configuration.
//!
//! Every component receives its configuration at construction; nothing is
//! read from the process environment in this crate.

use std::time::Duration;

use rand::Rng;

use crate::retry::RetryPolicy;

/// CSS selectors for the portal's fixed login and search flows.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub username_input: String,
    pub password_input: String,
    pub login_button: String,
    pub login_failure_banner: String,
    pub search_input: String,
    pub search_button: String,
    pub result_container: String,
    pub no_result_banner: String,
    pub availability_label: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            username_input: r#"input[autocomplete="username"]"#.into(),
            password_input: r#"input[autocomplete="current-password"]"#.into(),
            login_button: "div.login-button".into(),
            login_failure_banner: "div.alert-danger".into(),
            search_input: r#"input[type="search"]"#.into(),
            search_button: "button.como-search-btn".into(),
            result_container: "div.como-prod-tile-st-wrapper > section".into(),
            no_result_banner: "div.alert.alert-info".into(),
            availability_label: r#"span[style="text-decoration: underline;"]"#.into(),
        }
    }
}

/// Uniform random pause window applied after each search.
#[derive(Debug, Clone, Copy)]
pub struct PauseWindow {
    pub min: Duration,
    pub max: Duration,
}

impl PauseWindow {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Zero-length window; every sample is `Duration::ZERO`.
    pub const fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Draws a uniform duration from `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span_ms = (self.max - self.min).as_millis() as u64;
        let extra = rand::thread_rng().gen_range(0..=span_ms);
        self.min + Duration::from_millis(extra)
    }
}

/// Full configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Portal login page; also the page carrying the search box.
    pub login_url: String,
    pub selectors: Selectors,
    /// Retry budget for the login flow. Exhaustion is fatal.
    pub login_retry: RetryPolicy,
    /// Retry budget per product code. Exhaustion records a failure status.
    pub lookup_retry: RetryPolicy,
    /// Fixed interval letting the page settle after a submit.
    pub settle: Duration,
    /// Randomized inter-search pause. Deliberate rate limiting against the
    /// portal's anti-automation heuristics, not incidental.
    pub search_pause: PauseWindow,
    /// Bound on waiting for the result tile or a selector to appear.
    pub result_timeout: Duration,
    /// Hard deadline for one lookup attempt; overruns record `Error`
    /// instead of hanging. Zero disables the deadline.
    pub attempt_deadline: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            login_url: "https://b2b.meinl.de/Account/Login".into(),
            selectors: Selectors::default(),
            login_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            lookup_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            settle: Duration::from_secs(2),
            search_pause: PauseWindow::new(Duration::from_secs(2), Duration::from_secs(3)),
            result_timeout: Duration::from_secs(10),
            attempt_deadline: Duration::from_secs(60),
        }
    }
}

impl SyncConfig {
    /// Configuration with every wait collapsed, for scripted-page tests.
    pub fn immediate() -> Self {
        Self {
            login_retry: RetryPolicy::new(3, Duration::ZERO),
            lookup_retry: RetryPolicy::new(3, Duration::ZERO),
            settle: Duration::ZERO,
            search_pause: PauseWindow::none(),
            result_timeout: Duration::ZERO,
            attempt_deadline: Duration::ZERO,
            ..Self::default()
        }
    }
}
