//! Record store boundary.
//!
//! A store holds one ordered collection of records (the active inventory or the trash).
//! It knows nothing about lifecycle rules; the [`LifecycleManager`](crate::LifecycleManager)
//! decides per state transition whether a store is rewritten or appended to.

pub mod csv;
pub mod in_memory;

use std::path::PathBuf;

use thiserror::Error;

use decor_inventory::InventoryRecord;

pub use self::csv::CsvRecordStore;
pub use in_memory::InMemoryRecordStore;

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A well-shaped line whose fields do not parse. Fails the whole read.
    #[error("corrupt store {path} (line {line}): {reason}")]
    Corrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// Injected failure from the in-memory store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One persisted collection of records.
pub trait RecordStore {
    /// Read every record in stored order. A store that does not exist yet is empty.
    fn load(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Replace the whole contents with `records`.
    fn rewrite(&self, records: &[InventoryRecord]) -> Result<(), StoreError>;

    /// Add one record at the end.
    fn append(&self, record: &InventoryRecord) -> Result<(), StoreError>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn load(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).load()
    }

    fn rewrite(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        (**self).rewrite(records)
    }

    fn append(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
