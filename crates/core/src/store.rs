//! Spreadsheet store capability interface.

use async_trait::async_trait;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Configured sheet/tab absent in the store. The orchestrator logs and
    /// skips the sheet; the run continues.
    #[error("sheet range not found: {0}")]
    RangeMissing(String),

    /// Sheet exists but holds no data rows. Fatal, aborts the run.
    #[error("sheet has no data rows: {0}")]
    Empty(String),

    /// Unrecoverable store failure (auth, transport, malformed payload).
    #[error("spreadsheet store failure: {0}")]
    Fatal(#[from] anyhow::Error),
}

/// One data row from a sheet tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub code: String,
    /// Availability cell from the previous sync, if any.
    pub prior: Option<String>,
}

impl SheetRow {
    pub fn new(code: impl Into<String>, prior: Option<&str>) -> Self {
        Self {
            code: code.into(),
            prior: prior.map(str::to_string),
        }
    }
}

/// External spreadsheet store, one named tab per unit of work.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Reads `(code, prior availability)` rows for one tab, in sheet order.
    async fn read_rows(&self, sheet: &str) -> StoreResult<Vec<SheetRow>>;

    /// Writes `(code, availability)` rows for one tab, aligned to the rows
    /// returned by [`read_rows`](Self::read_rows).
    async fn write_rows(&self, sheet: &str, rows: &[(String, String)]) -> StoreResult<()>;
}
