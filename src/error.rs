//! Errors surfaced by the entry store and the import codec.
//!
//! - [`ValidationError`] rejects a create/update before anything changes.
//! - [`ImportError`] rejects a whole import; nothing is applied.
//! - [`StorageError`] comes from the persistence slot.
//! - [`StoreError`] wraps all of the above plus [`NotFound`].
//!
//! [`NotFound`]: StoreError::NotFound
use thiserror::Error;

/// Field validation failures, checked in declaration order
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("RO is required")]
    MissingRo,
    #[error("Date is required (YYYY-MM-DD)")]
    InvalidDate,
    #[error("Hours must be a number ≥ 0")]
    InvalidHours,
}

/// Import failures. Display is the single message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Import failed. Provide a JSON export from this app.")]
    NotAnArray,
    #[error("Import failed. Provide a JSON export from this app.")]
    ParseFailure(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("snapshot encoding: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("`{0}` entry not found")]
    NotFound(String),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("failed to persist entries: {0}")]
    Storage(#[from] StorageError),
}
