//! Availability sync engine for a partner B2B portal.
//!
//! The hard part lives here: keeping one authenticated browser session
//! alive across failures, driving a per-code search-and-classify protocol
//! against a semi-reliable UI, and bounding retries at both the login and
//! lookup level without dropping already-computed results.
//!
//! Browser automation and the spreadsheet store are capability interfaces
//! ([`PageDriver`], [`SheetStore`]); real implementations live in the CLI
//! crate, scripted doubles in [`testing`].

pub mod config;
pub mod error;
pub mod lookup;
pub mod orchestrator;
pub mod page;
pub mod retry;
pub mod session;
pub mod store;
pub mod testing;
pub mod types;

pub use config::{PauseWindow, Selectors, SyncConfig};
pub use error::{Result, SyncError};
pub use lookup::LookupEngine;
pub use orchestrator::{SheetSyncOrchestrator, SyncReport};
pub use page::{PageDriver, PageError, PageResult};
pub use retry::RetryPolicy;
pub use session::{BrowserSession, SessionError};
pub use store::{SheetRow, SheetStore, StoreError, StoreResult};
pub use types::{AvailabilityStatus, Credentials, ResultMap, SheetTask};
