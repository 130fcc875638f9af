//! End-to-end sync runs against scripted page and store doubles.

use stocksync::testing::{MemoryStore, ScriptedOutcome, ScriptedPage};
use stocksync::{
    BrowserSession, Credentials, SessionError, SheetRow, SheetSyncOrchestrator, SyncConfig,
    SyncError,
};
use tokio_util::sync::CancellationToken;

fn session(page: ScriptedPage) -> BrowserSession<ScriptedPage> {
    BrowserSession::new(
        page,
        SyncConfig::immediate(),
        Credentials::new("buyer@example.com", "secret"),
    )
}

#[tokio::test]
async fn worked_example_resolves_every_code() {
    let page = ScriptedPage::new();
    page.script("A1", ScriptedOutcome::Found("In Stock".into()));
    page.script("A2", ScriptedOutcome::NoResult);
    page.script("A3", ScriptedOutcome::Silent);

    let store = MemoryStore::new();
    store.set_sheet(
        "Drums",
        vec![
            SheetRow::new("A1", None),
            SheetRow::new("A2", None),
            SheetRow::new("A3", None),
        ],
    );

    let session = session(page);
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()]);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.sheets_synced, 1);
    assert_eq!(report.codes_resolved, 3);

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].1,
        [
            ("A1".to_string(), "In Stock".to_string()),
            ("A2".to_string(), "Not Found".to_string()),
            ("A3".to_string(), "Code Error or Not Found".to_string()),
        ]
    );

    // NotFound is terminal on sight; silence burns the full retry budget.
    assert_eq!(session.page().search_count("A2"), 1);
    assert_eq!(session.page().search_count("A3"), 3);
}

#[tokio::test]
async fn transient_silence_recovers_on_retry() {
    let page = ScriptedPage::new();
    page.script_sequence(
        "A1",
        vec![
            ScriptedOutcome::Silent,
            ScriptedOutcome::Found("In Stock".into()),
        ],
    );

    let store = MemoryStore::new();
    store.set_sheet("Drums", vec![SheetRow::new("A1", None)]);

    let session = session(page);
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()]);
    orchestrator.run().await.unwrap();

    assert_eq!(session.page().search_count("A1"), 2);
    assert_eq!(
        store.writes()[0].1,
        [("A1".to_string(), "In Stock".to_string())]
    );
}

#[tokio::test]
async fn login_exhaustion_aborts_before_any_lookup() {
    let page = ScriptedPage::new();
    page.fail_logins(3);

    let store = MemoryStore::new();
    store.set_sheet("Drums", vec![SheetRow::new("A1", None)]);

    let session = session(page);
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()]);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Auth(SessionError::AuthFailed { attempts: 3 })
    ));
    assert_eq!(session.page().total_searches(), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn missing_sheet_is_skipped_and_run_completes() {
    let page = ScriptedPage::new();
    page.script("A1", ScriptedOutcome::Found("In Stock".into()));

    let store = MemoryStore::new();
    store.set_sheet("Live", vec![SheetRow::new("A1", None)]);

    let session = session(page);
    let orchestrator =
        SheetSyncOrchestrator::new(&session, &store, vec!["Ghost".into(), "Live".into()]);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.sheets_skipped, 1);
    assert_eq!(report.sheets_synced, 1);

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "Live");
}

#[tokio::test]
async fn fatal_store_error_aborts_the_run() {
    let store = MemoryStore::new();
    store.set_fatal(true);

    let session = session(ScriptedPage::new());
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()]);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Store(_)));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn cancellation_stops_before_touching_sheets() {
    let store = MemoryStore::new();
    store.set_sheet("Drums", vec![SheetRow::new("A1", None)]);

    let token = CancellationToken::new();
    token.cancel();

    let session = session(ScriptedPage::new());
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()])
        .with_cancellation(token);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Cancelled));
    assert_eq!(session.page().total_searches(), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn duplicate_codes_write_one_row_per_input_row() {
    let page = ScriptedPage::new();
    page.script("A1", ScriptedOutcome::Found("In Stock".into()));

    let store = MemoryStore::new();
    store.set_sheet(
        "Drums",
        vec![SheetRow::new("A1", None), SheetRow::new("A1", None)],
    );

    let session = session(page);
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()]);
    let report = orchestrator.run().await.unwrap();

    // Each occurrence is re-queried, the map holds one entry, and the
    // write-back stays aligned to the two input rows.
    assert_eq!(session.page().search_count("A1"), 2);
    assert_eq!(report.codes_resolved, 1);
    assert_eq!(
        store.writes()[0].1,
        [
            ("A1".to_string(), "In Stock".to_string()),
            ("A1".to_string(), "In Stock".to_string()),
        ]
    );
}

#[tokio::test]
async fn fresh_result_overrides_prior_value() {
    let page = ScriptedPage::new();
    page.script("A1", ScriptedOutcome::Found("In Stock".into()));

    let store = MemoryStore::new();
    store.set_sheet("Drums", vec![SheetRow::new("A1", Some("Not Found"))]);

    let session = session(page);
    let orchestrator = SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into()]);
    orchestrator.run().await.unwrap();

    assert_eq!(
        store.writes()[0].1,
        [("A1".to_string(), "In Stock".to_string())]
    );
}

#[tokio::test]
async fn multiple_sheets_sync_in_order() {
    let page = ScriptedPage::new();
    page.script("A1", ScriptedOutcome::Found("In Stock".into()));
    page.script("B1", ScriptedOutcome::NoResult);

    let store = MemoryStore::new();
    store.set_sheet("Drums", vec![SheetRow::new("A1", None)]);
    store.set_sheet("Cymbals", vec![SheetRow::new("B1", None)]);

    let session = session(page);
    let orchestrator =
        SheetSyncOrchestrator::new(&session, &store, vec!["Drums".into(), "Cymbals".into()]);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.sheets_synced, 2);
    let writes = store.writes();
    assert_eq!(writes[0].0, "Drums");
    assert_eq!(writes[1].0, "Cymbals");
    assert_eq!(writes[1].1, [("B1".to_string(), "Not Found".to_string())]);
}
