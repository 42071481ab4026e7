use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use decor_inventory::InventoryRecord;

use super::{RecordStore, StoreError};

/// In-memory record store.
///
/// Intended for tests. Writes can be made to fail on demand to exercise the
/// lifecycle manager's rollback path.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    name: String,
    records: RwLock<Vec<InventoryRecord>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_records(name: impl Into<String>, records: Vec<InventoryRecord>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Make every following `rewrite`/`append` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<InventoryRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{}: writes disabled", self.name)));
        }
        Ok(())
    }

    fn poisoned(&self) -> StoreError {
        StoreError::Unavailable(format!("{}: lock poisoned", self.name))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn load(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        self.records
            .read()
            .map(|r| r.clone())
            .map_err(|_| self.poisoned())
    }

    fn rewrite(&self, records: &[InventoryRecord]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut guard = self.records.write().map_err(|_| self.poisoned())?;
        *guard = records.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn append(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut guard = self.records.write().map_err(|_| self.poisoned())?;
        guard.push(record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}
