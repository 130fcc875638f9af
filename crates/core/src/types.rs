//! Core data types for availability tracking.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Spreadsheet cell text written for codes the portal does not know.
pub const NOT_FOUND_CELL: &str = "Not Found";

/// Spreadsheet cell text written when retries exhaust without a result.
pub const ERROR_CELL: &str = "Code Error or Not Found";

/// Portal login credentials, supplied once and immutable for the run.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Classified outcome of querying one product code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    /// Product tile rendered; carries the raw availability label text.
    Available(String),
    /// Portal reported no matching product. Trusted, never retried.
    NotFound,
    /// Neither result tile nor no-result banner appeared in time.
    NotLoaded,
    /// A page error interrupted the lookup attempt.
    Error,
}

impl AvailabilityStatus {
    /// Whether another attempt could still change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotLoaded | Self::Error)
    }

    /// Cell text written back to the spreadsheet for this status.
    pub fn as_cell(&self) -> &str {
        match self {
            Self::Available(label) => label,
            Self::NotFound => NOT_FOUND_CELL,
            Self::NotLoaded | Self::Error => ERROR_CELL,
        }
    }

    /// Inverse of [`as_cell`](Self::as_cell), used to seed prior values
    /// read back from the store.
    pub fn from_cell(cell: &str) -> Self {
        match cell {
            NOT_FOUND_CELL => Self::NotFound,
            ERROR_CELL => Self::Error,
            label => Self::Available(label.to_string()),
        }
    }
}

/// Unit of work for one spreadsheet tab.
#[derive(Debug, Clone)]
pub struct SheetTask {
    pub name: String,
    pub rows: Vec<crate::store::SheetRow>,
}

/// Ordered code-to-status mapping built incrementally per sheet.
///
/// Preserves first-insertion order so iteration lines up with input rows.
/// Re-inserting an existing code replaces its status in place without
/// reordering.
#[derive(Debug, Default)]
pub struct ResultMap {
    order: Vec<String>,
    statuses: HashMap<String, AvailabilityStatus>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, status: AvailabilityStatus) {
        if !self.statuses.contains_key(code) {
            self.order.push(code.to_string());
        }
        self.statuses.insert(code.to_string(), status);
    }

    pub fn get(&self, code: &str) -> Option<&AvailabilityStatus> {
        self.statuses.get(code)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AvailabilityStatus)> {
        self.order
            .iter()
            .map(|code| (code.as_str(), &self.statuses[code.as_str()]))
    }
}
