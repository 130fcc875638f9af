//! Test doubles for the page and store capability interfaces.
//!
//! [`ScriptedPage`] plays back configured per-code outcomes without a
//! browser and records every action for later assertion; [`MemoryStore`]
//! serves sheet rows from memory and records writes.
//!
//! # Example
//!
//! ```ignore
//! use stocksync::testing::{ScriptedOutcome, ScriptedPage};
//!
//! let page = ScriptedPage::new();
//! page.script("A1", ScriptedOutcome::Found("In Stock".into()));
//! page.script("A2", ScriptedOutcome::NoResult);
//! // ... run lookups against the page
//! assert_eq!(page.search_count("A1"), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Selectors;
use crate::page::{PageDriver, PageError, PageResult};
use crate::store::{SheetRow, SheetStore, StoreError, StoreResult};

/// Scripted portal behavior for one search of one product code.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Result tile renders with this availability label.
    Found(String),
    /// Result tile renders without a label element.
    FoundWithoutLabel,
    /// No-result banner renders.
    NoResult,
    /// Neither tile nor banner renders before the timeout.
    Silent,
    /// The wait for results never resolves at all.
    Stalled,
    /// The page raises an error while waiting for results.
    Broken,
    /// Both banner and tile render; pins banner precedence in tests.
    BannerAndTile,
}

/// Action recorded by [`ScriptedPage`] for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Navigate { url: String },
    TypeText { selector: String, text: String },
    Click { selector: String },
    Evaluate { expression: String },
}

/// Scripted page for driving the session and lookup protocols in tests.
///
/// Interprets driver calls against the default [`Selectors`]: typing into
/// the search input sets the pending code, clicking the search button
/// consumes the next scripted outcome for that code.
pub struct ScriptedPage {
    selectors: Selectors,
    scripts: Mutex<HashMap<String, VecDeque<ScriptedOutcome>>>,
    active: Mutex<Option<ScriptedOutcome>>,
    pending_code: Mutex<String>,
    search_counts: Mutex<HashMap<String, u32>>,
    fail_logins: Mutex<u32>,
    login_submits: Mutex<u32>,
    actions: Mutex<Vec<PageAction>>,
}

impl Default for ScriptedPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::default(),
            scripts: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
            pending_code: Mutex::new(String::new()),
            search_counts: Mutex::new(HashMap::new()),
            fail_logins: Mutex::new(0),
            login_submits: Mutex::new(0),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Scripts the same outcome for every search of `code`.
    pub fn script(&self, code: &str, outcome: ScriptedOutcome) {
        self.script_sequence(code, vec![outcome]);
    }

    /// Scripts per-attempt outcomes for `code`; the last entry is sticky.
    pub fn script_sequence(&self, code: &str, outcomes: Vec<ScriptedOutcome>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(code.to_string(), outcomes.into());
    }

    /// Makes the first `count` login submits fail with the failure banner.
    pub fn fail_logins(&self, count: u32) {
        *self.fail_logins.lock().unwrap() = count;
    }

    /// All recorded actions, in order.
    pub fn actions(&self) -> Vec<PageAction> {
        self.actions.lock().unwrap().clone()
    }

    /// How many times `code` was submitted through the search control.
    pub fn search_count(&self, code: &str) -> u32 {
        self.search_counts
            .lock()
            .unwrap()
            .get(code)
            .copied()
            .unwrap_or(0)
    }

    /// Total searches across all codes.
    pub fn total_searches(&self) -> u32 {
        self.search_counts.lock().unwrap().values().sum()
    }

    /// Text typed into `selector`, in order.
    pub fn typed_into(&self, selector: &str) -> Vec<String> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .filter_map(|action| match action {
                PageAction::TypeText { selector: s, text } if s == selector => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// JavaScript expressions evaluated so far.
    pub fn evaluated_expressions(&self) -> Vec<String> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .filter_map(|action| match action {
                PageAction::Evaluate { expression } => Some(expression.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: PageAction) {
        self.actions.lock().unwrap().push(action);
    }

    fn active_outcome(&self) -> ScriptedOutcome {
        self.active
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(ScriptedOutcome::Silent)
    }

    fn begin_search(&self) {
        let code = self.pending_code.lock().unwrap().clone();
        *self
            .search_counts
            .lock()
            .unwrap()
            .entry(code.clone())
            .or_insert(0) += 1;

        let mut scripts = self.scripts.lock().unwrap();
        let outcome = match scripts.get_mut(&code) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        *self.active.lock().unwrap() = Some(outcome.unwrap_or(ScriptedOutcome::Silent));
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn navigate(&self, url: &str) -> PageResult<()> {
        self.record(PageAction::Navigate {
            url: url.to_string(),
        });
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> PageResult<()> {
        if selector == self.selectors.result_container {
            return match self.active_outcome() {
                ScriptedOutcome::Found(_)
                | ScriptedOutcome::FoundWithoutLabel
                | ScriptedOutcome::BannerAndTile => Ok(()),
                ScriptedOutcome::Broken => Err(PageError::Other("detached frame".into())),
                ScriptedOutcome::Stalled => std::future::pending().await,
                ScriptedOutcome::NoResult | ScriptedOutcome::Silent => Err(PageError::Timeout {
                    ms: timeout.as_millis() as u64,
                    selector: selector.to_string(),
                }),
            };
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> PageResult<()> {
        self.record(PageAction::TypeText {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        if selector == self.selectors.search_input {
            *self.pending_code.lock().unwrap() = text.to_string();
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> PageResult<()> {
        self.record(PageAction::Click {
            selector: selector.to_string(),
        });
        if selector == self.selectors.login_button {
            *self.login_submits.lock().unwrap() += 1;
        } else if selector == self.selectors.search_button {
            self.begin_search();
        }
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> PageResult<serde_json::Value> {
        self.record(PageAction::Evaluate {
            expression: expression.to_string(),
        });
        Ok(serde_json::Value::Null)
    }

    async fn element_exists(&self, selector: &str) -> PageResult<bool> {
        if selector == self.selectors.login_failure_banner {
            let submits = *self.login_submits.lock().unwrap();
            return Ok(submits <= *self.fail_logins.lock().unwrap());
        }
        if selector == self.selectors.no_result_banner {
            return Ok(matches!(
                self.active_outcome(),
                ScriptedOutcome::NoResult | ScriptedOutcome::BannerAndTile
            ));
        }
        if selector == self.selectors.result_container {
            return Ok(matches!(
                self.active_outcome(),
                ScriptedOutcome::Found(_)
                    | ScriptedOutcome::FoundWithoutLabel
                    | ScriptedOutcome::BannerAndTile
            ));
        }
        Ok(false)
    }

    async fn text_content(&self, selector: &str) -> PageResult<Option<String>> {
        if selector == self.selectors.availability_label {
            if let ScriptedOutcome::Found(label) = self.active_outcome() {
                return Ok(Some(label));
            }
            return Ok(None);
        }
        Ok(None)
    }
}

/// In-memory spreadsheet store recording writes for assertion.
#[derive(Default)]
pub struct MemoryStore {
    sheets: Mutex<HashMap<String, Vec<SheetRow>>>,
    writes: Mutex<Vec<(String, Vec<(String, String)>)>>,
    fatal: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tab and its data rows.
    pub fn set_sheet(&self, name: &str, rows: Vec<SheetRow>) {
        self.sheets.lock().unwrap().insert(name.to_string(), rows);
    }

    /// Makes every subsequent call fail with a fatal store error.
    pub fn set_fatal(&self, fatal: bool) {
        *self.fatal.lock().unwrap() = fatal;
    }

    /// All recorded writes: `(sheet, rows)` in call order.
    pub fn writes(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn read_rows(&self, sheet: &str) -> StoreResult<Vec<SheetRow>> {
        if *self.fatal.lock().unwrap() {
            return Err(StoreError::Fatal(anyhow::anyhow!("store offline")));
        }
        let sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::RangeMissing(format!("{sheet}!A:B")))?;
        if rows.is_empty() {
            return Err(StoreError::Empty(sheet.to_string()));
        }
        Ok(rows)
    }

    async fn write_rows(&self, sheet: &str, rows: &[(String, String)]) -> StoreResult<()> {
        if *self.fatal.lock().unwrap() {
            return Err(StoreError::Fatal(anyhow::anyhow!("store offline")));
        }
        self.writes
            .lock()
            .unwrap()
            .push((sheet.to_string(), rows.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_page_defaults_to_silence() {
        let page = ScriptedPage::new();
        page.type_text(&Selectors::default().search_input, "UNKNOWN")
            .await
            .unwrap();
        page.click(&Selectors::default().search_button).await.unwrap();

        let err = page
            .wait_for_selector(&Selectors::default().result_container, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn scripted_sequences_advance_per_search() {
        let selectors = Selectors::default();
        let page = ScriptedPage::new();
        page.script_sequence(
            "A1",
            vec![ScriptedOutcome::Silent, ScriptedOutcome::Found("In Stock".into())],
        );

        for _ in 0..2 {
            page.type_text(&selectors.search_input, "A1").await.unwrap();
            page.click(&selectors.search_button).await.unwrap();
        }

        // Second search consumed the sticky Found outcome.
        assert!(
            page.wait_for_selector(&selectors.result_container, Duration::ZERO)
                .await
                .is_ok()
        );
        assert_eq!(page.search_count("A1"), 2);
    }

    #[tokio::test]
    async fn memory_store_reports_missing_ranges() {
        let store = MemoryStore::new();
        let err = store.read_rows("Ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::RangeMissing(_)));
    }

    #[tokio::test]
    async fn memory_store_records_writes() {
        let store = MemoryStore::new();
        store.set_sheet("Live", vec![SheetRow::new("A1", None)]);

        store
            .write_rows("Live", &[("A1".into(), "In Stock".into())])
            .await
            .unwrap();

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "Live");
        assert_eq!(writes[0].1, [("A1".to_string(), "In Stock".to_string())]);
    }
}
