//! Top-level sheet sync driver.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::lookup::LookupEngine;
use crate::page::PageDriver;
use crate::session::BrowserSession;
use crate::store::{SheetStore, StoreError};
use crate::types::{AvailabilityStatus, ResultMap, SheetTask};

/// Outcome summary for a completed run.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub sheets_synced: usize,
    pub sheets_skipped: usize,
    pub codes_resolved: usize,
}

/// Drives the whole run: per sheet, read codes, resolve each through the
/// retrying lookup engine, flush results back to the store.
///
/// Strictly sequential on purpose: the portal has one search box per page,
/// so codes within a sheet and sheets within a run are handled one at a
/// time.
pub struct SheetSyncOrchestrator<'a, P: PageDriver, S: SheetStore> {
    session: &'a BrowserSession<P>,
    store: &'a S,
    sheets: Vec<String>,
    cancel: CancellationToken,
}

impl<'a, P: PageDriver, S: SheetStore> SheetSyncOrchestrator<'a, P, S> {
    pub fn new(session: &'a BrowserSession<P>, store: &'a S, sheets: Vec<String>) -> Self {
        Self {
            session,
            store,
            sheets,
            cancel: CancellationToken::new(),
        }
    }

    /// Installs a cancellation signal, checked between codes and sheets.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run(&self) -> Result<SyncReport> {
        // No point touching sheets unauthenticated.
        self.session.login().await?;

        let engine = LookupEngine::new(self.session);
        let mut report = SyncReport::default();

        for sheet in &self.sheets {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let rows = match self.store.read_rows(sheet).await {
                Ok(rows) => rows,
                Err(StoreError::RangeMissing(range)) => {
                    warn!(target = "stocksync", %sheet, %range, "sheet range missing, skipping");
                    report.sheets_skipped += 1;
                    continue;
                }
                Err(err) => return Err(SyncError::Store(err)),
            };

            let task = SheetTask {
                name: sheet.clone(),
                rows,
            };
            let results = self.sync_sheet(&engine, &task).await?;
            report.codes_resolved += results.len();

            // One output row per input row, so range updates stay aligned
            // even when a code appears twice.
            let cells: Vec<(String, String)> = task
                .rows
                .iter()
                .map(|row| {
                    let status = results
                        .get(&row.code)
                        .cloned()
                        .unwrap_or(AvailabilityStatus::Error);
                    (row.code.clone(), status.as_cell().to_string())
                })
                .collect();

            self.store.write_rows(sheet, &cells).await?;
            report.sheets_synced += 1;
            info!(target = "stocksync", %sheet, codes = cells.len(), "sheet synced");
        }

        Ok(report)
    }

    async fn sync_sheet(&self, engine: &LookupEngine<'a, P>, task: &SheetTask) -> Result<ResultMap> {
        let mut results = ResultMap::new();

        // Prior values survive unless this run resolves the code again.
        for row in &task.rows {
            if let Some(prior) = row.prior.as_deref().filter(|cell| !cell.is_empty()) {
                results.insert(&row.code, AvailabilityStatus::from_cell(prior));
            }
        }

        let total = task.rows.len();
        for (index, row) in task.rows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            self.session.ensure_ready().await?;

            info!(
                target = "stocksync",
                sheet = %task.name,
                code = %row.code,
                position = index + 1,
                total,
                "checking code"
            );

            let policy = self.session.config().lookup_retry;
            let (status, attempts) = policy
                .run(|| engine.lookup(&row.code), AvailabilityStatus::is_retryable)
                .await;

            if status.is_retryable() {
                warn!(
                    target = "stocksync",
                    code = %row.code,
                    attempts,
                    "lookup exhausted retries, recording failure status"
                );
            }
            results.insert(&row.code, status);
        }

        Ok(results)
    }
}
