//! Run-level error taxonomy.
//!
//! Only two failure classes abort a run: authentication exhausting its
//! retry budget, and fatal store errors. Every per-code and per-attempt
//! failure is absorbed into an [`crate::types::AvailabilityStatus`] value
//! instead of propagating.

use thiserror::Error;

use crate::session::SessionError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Auth(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("run cancelled")]
    Cancelled,
}
