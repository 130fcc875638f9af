//! Browser automation capability interface.
//!
//! The session and lookup protocols drive the page through this trait so
//! they can run against a real CDP-backed page or a scripted test double
//! without change.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub type PageResult<T> = std::result::Result<T, PageError>;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("navigation failed: {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("timeout after {ms}ms waiting for: {selector}")]
    Timeout { ms: u64, selector: String },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("javascript evaluation failed: {0}")]
    Eval(String),

    #[error("page error: {0}")]
    Other(String),
}

impl PageError {
    /// Timeouts classify as `NotLoaded` rather than `Error` in the lookup
    /// protocol; everything else is a hard attempt failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Low-level page actions the core needs from a browser.
///
/// One implementor drives a real Chromium page over CDP; the scripted
/// double in [`crate::testing`] plays back configured outcomes.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigates the page to `url` and waits for the load to commit.
    async fn navigate(&self, url: &str) -> PageResult<()>;

    /// Resolves once an element matching `selector` exists, or fails with
    /// [`PageError::Timeout`] after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> PageResult<()>;

    /// Types `text` into the element matching `selector`.
    async fn type_text(&self, selector: &str, text: &str) -> PageResult<()>;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> PageResult<()>;

    /// Evaluates a JavaScript `expression` in the page.
    async fn evaluate(&self, expression: &str) -> PageResult<serde_json::Value>;

    /// Whether an element matching `selector` currently exists.
    async fn element_exists(&self, selector: &str) -> PageResult<bool>;

    /// `textContent` of the first match, or [`None`] if absent.
    async fn text_content(&self, selector: &str) -> PageResult<Option<String>>;
}
