//! Process configuration from the environment.

use anyhow::{Context, Result, bail};
use stocksync::Credentials;

const DEFAULT_KEY_FILE: &str = "./credential.json";

/// Everything the run needs from the environment, resolved up front so a
/// misconfigured deployment fails before a browser is launched.
#[derive(Debug)]
pub struct Settings {
    pub credentials: Credentials,
    pub spreadsheet_id: String,
    pub sheet_names: Vec<String>,
    pub key_file: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let email = require("EMAIL")?;
        let password = require("PASSWORD")?;
        let spreadsheet_id = require("SPREADSHEET_ID")?;

        // SHEET_NAMES takes a comma-separated list; SHEET_NAME remains as
        // the single-tab spelling.
        let raw_sheets = std::env::var("SHEET_NAMES")
            .or_else(|_| std::env::var("SHEET_NAME"))
            .context("SHEET_NAMES (or SHEET_NAME) is not set")?;
        let sheet_names = parse_sheet_names(&raw_sheets);
        if sheet_names.is_empty() {
            bail!("SHEET_NAMES is set but contains no sheet names");
        }

        let key_file =
            std::env::var("GOOGLE_CREDENTIALS").unwrap_or_else(|_| DEFAULT_KEY_FILE.to_string());

        Ok(Self {
            credentials: Credentials::new(email, password),
            spreadsheet_id,
            sheet_names,
            key_file,
        })
    }
}

fn require(name: &str) -> Result<String> {
    let value = std::env::var(name).with_context(|| format!("{name} is not set"))?;
    if value.trim().is_empty() {
        bail!("{name} is set but empty");
    }
    Ok(value)
}

fn parse_sheet_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
