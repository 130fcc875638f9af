use anyhow::{Context, Result};
use clap::Parser;
use stocksync::{BrowserSession, SheetSyncOrchestrator, SyncConfig, SyncReport};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod browser;
mod cli;
mod logging;
mod settings;
mod sheets;

use browser::CdpPage;
use cli::Cli;
use settings::Settings;
use sheets::GoogleSheetsStore;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(&cli).await {
        Ok(report) => {
            let payload = serde_json::json!({ "ok": true, "report": report });
            println!("{payload}");
        }
        Err(err) => {
            error!(target = "stocksync", error = format!("{err:#}"), "run failed");
            let payload = serde_json::json!({ "ok": false, "error": format!("{err:#}") });
            println!("{payload}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<SyncReport> {
    let settings = Settings::from_env()?;
    let store = GoogleSheetsStore::from_key_file(&settings.key_file, &settings.spreadsheet_id)?;

    let page = CdpPage::launch(!cli.headed).await?;
    let session = BrowserSession::new(page, SyncConfig::default(), settings.credentials.clone());

    // Ctrl-C stops between codes so the sheet written so far stays intact.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(target = "stocksync", "interrupt received, finishing current code");
            signal_token.cancel();
        }
    });

    let outcome = {
        let orchestrator =
            SheetSyncOrchestrator::new(&session, &store, settings.sheet_names.clone())
                .with_cancellation(cancel);
        orchestrator.run().await
    };

    session.into_page().close().await;

    outcome.context("sync run failed")
}
