//! # Record Storage
//!
//! Persistence primitive behind the record model. Two backends:
//!
//! - [`SqliteStore`]: the on-disk database used by the application.
//! - [`MemoryStore`]: a `Vec`-backed store for tests and throwaway sessions.
//!
//! Stores know nothing about validation or ordering. They hand back whole
//! records; [`crate::core::model::RecordModel`] decides what to do with them.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::core::record::{Record, RecordFields, RecordId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    /// A stored row could not be converted back into a record.
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create/read/update/delete/list over records.
///
/// Access is strictly sequential, so `&mut self` on writes is all the
/// locking there is.
pub trait RecordStore {
    /// Insert a new record and return its assigned id.
    fn create(&mut self, fields: &RecordFields) -> Result<RecordId, StoreError>;

    /// `Ok(None)` when no record has this id.
    fn read(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// Overwrite a record in place. Returns `false` if `id` does not exist.
    fn update(&mut self, id: RecordId, fields: &RecordFields) -> Result<bool, StoreError>;

    /// Remove a record. Missing ids are not an error.
    fn delete(&mut self, id: RecordId) -> Result<(), StoreError>;

    /// Every record, in insertion order.
    fn list(&self) -> Result<Vec<Record>, StoreError>;
}
