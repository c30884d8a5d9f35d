use std::collections::HashSet;

use super::domain::{RequestRecord, RosterRecord};

/// Read-only roster snapshot source.
pub trait RosterSource: Send + Sync {
    fn load_roster(&self) -> Result<Vec<RosterRecord>, StoreError>;
}

/// Append-only request log. Existing rows are never rewritten.
pub trait RequestStore: Send + Sync {
    /// Column 0 of every stored row.
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError>;
    fn append(&self, record: &RequestRecord) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store data: {0}")]
    Csv(#[from] csv::Error),
}
