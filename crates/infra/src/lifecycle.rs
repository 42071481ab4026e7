//! Lifecycle manager: executes inventory commands and persists their effects.
//!
//! ## Execution flow
//!
//! ```text
//! Command
//!   ↓
//! 1. Handle against the current inventory (pure, produces events)
//!   ↓
//! 2. Apply the events to a copy of the inventory
//!   ↓
//! 3. Write the stores each event requires (rewrite or append)
//!   ↓
//! 4. Commit the copy as the new in-memory state
//! ```
//!
//! In-memory state only changes once every store write succeeded. When a write fails
//! part way, the stores already touched are rewritten from the unchanged in-memory state
//! and the write error is returned.
//!
//! | Event | Store writes |
//! |---|---|
//! | item created / updated | rewrite active |
//! | item soft-deleted | append to deleted, rewrite active |
//! | item restored | rewrite deleted, append to active |
//! | all items restored | append each to active, rewrite deleted |
//! | item purged / trash emptied | rewrite deleted |

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};

use decor_core::{Aggregate, DomainError, ItemNumber};
use decor_inventory::{
    CreateItem, FieldChange, Inventory, InventoryCommand, InventoryEvent, InventoryRecord,
    ItemName, ItemType, PurgeItem, ReportSection, RestoreItem, SoftDeleteItem, SortMode,
    UpdateItem, allocate_item_number, report, validate,
};

use crate::config::StoreConfig;
use crate::store::{CsvRecordStore, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LifecycleError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LifecycleError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LifecycleError::Domain(DomainError::Validation(_) | DomainError::InvalidId(_))
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LifecycleError::Domain(DomainError::Conflict(_)))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, LifecycleError::Domain(DomainError::Exhausted(_)))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, LifecycleError::Store(_))
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Input for a new record. The item number is allocated by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: ItemName,
    pub quantity: i64,
    pub item_type: ItemType,
    pub created_on: NaiveDate,
}

impl NewItem {
    /// A new item stamped with today's local date.
    pub fn new(name: ItemName, quantity: i64, item_type: ItemType) -> Self {
        Self {
            name,
            quantity,
            item_type,
            created_on: chrono::Local::now().date_naive(),
        }
    }
}

/// A requested change to one field of an active record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    ItemNumber(ItemNumber),
    /// Moves the record to a freshly allocated number in the new type's range.
    ItemType(ItemType),
    Name(ItemName),
    Quantity(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(InventoryRecord),
    /// The new value equals the current one; nothing was written.
    NoChangeDetected,
}

#[derive(Debug, Default)]
struct Touched {
    active: bool,
    deleted: bool,
}

/// Owns both record collections and the stores behind them.
pub struct LifecycleManager<S, R = StdRng> {
    active_store: S,
    deleted_store: S,
    inventory: Inventory,
    rng: R,
}

impl LifecycleManager<CsvRecordStore> {
    /// Open the CSV stores named by `config`.
    pub fn open_csv(config: &StoreConfig) -> LifecycleResult<Self> {
        Self::open(
            CsvRecordStore::new(config.inventory_path()),
            CsvRecordStore::new(config.deleted_path()),
        )
    }
}

impl<S: RecordStore> LifecycleManager<S> {
    pub fn open(active_store: S, deleted_store: S) -> LifecycleResult<Self> {
        Self::with_rng(active_store, deleted_store, StdRng::from_entropy())
    }
}

impl<S, R> LifecycleManager<S, R>
where
    S: RecordStore,
    R: Rng,
{
    /// Load both collections and keep `rng` for item number allocation.
    pub fn with_rng(active_store: S, deleted_store: S, rng: R) -> LifecycleResult<Self> {
        let inventory = Self::load(&active_store, &deleted_store)?;
        info!(
            active = inventory.active().len(),
            deleted = inventory.deleted().len(),
            "inventory loaded"
        );
        Ok(Self {
            active_store,
            deleted_store,
            inventory,
            rng,
        })
    }

    fn load(active_store: &S, deleted_store: &S) -> Result<Inventory, StoreError> {
        Ok(Inventory::from_parts(active_store.load()?, deleted_store.load()?))
    }

    pub fn active(&self) -> &[InventoryRecord] {
        self.inventory.active()
    }

    pub fn deleted(&self) -> &[InventoryRecord] {
        self.inventory.deleted()
    }

    pub fn find_active(&self, item_number: ItemNumber) -> Option<&InventoryRecord> {
        self.inventory.find_active(item_number)
    }

    pub fn find_deleted(&self, item_number: ItemNumber) -> Option<&InventoryRecord> {
        self.inventory.find_deleted(item_number)
    }

    /// Active records grouped by type and ordered by `mode`.
    pub fn report(&self, mode: SortMode) -> Vec<ReportSection> {
        report::build(self.inventory.active(), mode)
    }

    /// Re-read both stores, discarding the in-memory state.
    pub fn reload(&mut self) -> LifecycleResult<()> {
        self.inventory = Self::load(&self.active_store, &self.deleted_store)?;
        Ok(())
    }

    pub fn create(&mut self, item: NewItem) -> LifecycleResult<InventoryRecord> {
        validate::require_positive_quantity(item.quantity)?;
        let item_number = allocate_item_number(item.item_type, self.inventory.active(), &mut self.rng)?;
        let events = self.execute(InventoryCommand::CreateItem(CreateItem {
            name: item.name,
            quantity: item.quantity,
            item_type: item.item_type,
            item_number,
            created_on: item.created_on,
        }))?;

        let record = match events.into_iter().next() {
            Some(InventoryEvent::ItemCreated(record)) => record,
            other => return Err(unexpected("create", other)),
        };
        info!(
            item_number = %record.item_number(),
            item_type = %record.item_type(),
            "item created"
        );
        Ok(record)
    }

    pub fn update(&mut self, item_number: ItemNumber, update: FieldUpdate) -> LifecycleResult<UpdateOutcome> {
        let change = match update {
            FieldUpdate::ItemNumber(n) => FieldChange::ItemNumber(n),
            FieldUpdate::ItemType(item_type) => {
                let item_number = self.number_for_type_change(item_number, item_type)?;
                FieldChange::ItemType {
                    item_type,
                    item_number,
                }
            }
            FieldUpdate::Name(name) => FieldChange::Name(name.into_string()),
            FieldUpdate::Quantity(q) => FieldChange::Quantity(q),
        };
        let now_numbered = match &change {
            FieldChange::ItemNumber(n) => *n,
            FieldChange::ItemType { item_number, .. } => *item_number,
            FieldChange::Name(_) | FieldChange::Quantity(_) => item_number,
        };

        let events = self.execute(InventoryCommand::UpdateItem(UpdateItem { item_number, change }))?;
        if events.is_empty() {
            return Ok(UpdateOutcome::NoChangeDetected);
        }

        let record = self
            .inventory
            .find_active(now_numbered)
            .cloned()
            .ok_or_else(|| DomainError::invariant(format!("updated item {now_numbered} is missing")))?;
        info!(item_number = %item_number, now = %now_numbered, "item updated");
        Ok(UpdateOutcome::Updated(record))
    }

    /// Number the record will hold after moving to `item_type`. An unchanged type keeps
    /// the current number so the command reports no change.
    fn number_for_type_change(
        &mut self,
        item_number: ItemNumber,
        item_type: ItemType,
    ) -> LifecycleResult<ItemNumber> {
        match self.inventory.find_active(item_number) {
            Some(current) if current.item_type() != item_type => {
                Ok(allocate_item_number(item_type, self.inventory.active(), &mut self.rng)?)
            }
            Some(current) => Ok(current.item_number()),
            None => Ok(ItemNumber::new(item_type.base())),
        }
    }

    pub fn soft_delete(&mut self, item_number: ItemNumber) -> LifecycleResult<InventoryRecord> {
        let events = self.execute(InventoryCommand::SoftDeleteItem(SoftDeleteItem { item_number }))?;
        match events.into_iter().next() {
            Some(InventoryEvent::ItemSoftDeleted(record)) => {
                info!(item_number = %item_number, "item moved to trash");
                Ok(record)
            }
            other => Err(unexpected("soft delete", other)),
        }
    }

    pub fn restore(&mut self, item_number: ItemNumber) -> LifecycleResult<InventoryRecord> {
        let events = self.execute(InventoryCommand::RestoreItem(RestoreItem { item_number }))?;
        match events.into_iter().next() {
            Some(InventoryEvent::ItemRestored(record)) => {
                info!(item_number = %item_number, "item restored");
                Ok(record)
            }
            other => Err(unexpected("restore", other)),
        }
    }

    pub fn restore_all(&mut self) -> LifecycleResult<Vec<InventoryRecord>> {
        let events = self.execute(InventoryCommand::RestoreAll)?;
        match events.into_iter().next() {
            Some(InventoryEvent::AllItemsRestored(records)) => {
                info!(count = records.len(), "all deleted items restored");
                Ok(records)
            }
            other => Err(unexpected("restore all", other)),
        }
    }

    pub fn purge(&mut self, item_number: ItemNumber) -> LifecycleResult<InventoryRecord> {
        let events = self.execute(InventoryCommand::PurgeItem(PurgeItem { item_number }))?;
        match events.into_iter().next() {
            Some(InventoryEvent::ItemPurged(record)) => {
                info!(item_number = %item_number, "item permanently deleted");
                Ok(record)
            }
            other => Err(unexpected("purge", other)),
        }
    }

    pub fn purge_all(&mut self) -> LifecycleResult<Vec<InventoryRecord>> {
        let events = self.execute(InventoryCommand::PurgeAll)?;
        match events.into_iter().next() {
            Some(InventoryEvent::TrashEmptied(records)) => {
                info!(count = records.len(), "trash emptied");
                Ok(records)
            }
            other => Err(unexpected("purge all", other)),
        }
    }

    fn execute(&mut self, command: InventoryCommand) -> LifecycleResult<Vec<InventoryEvent>> {
        let events = self.inventory.handle(&command)?;
        if events.is_empty() {
            return Ok(events);
        }

        let mut next = self.inventory.clone();
        for event in &events {
            next.apply(event);
        }

        let mut touched = Touched::default();
        if let Err(err) = self.persist(&events, &next, &mut touched) {
            self.roll_back(&touched, &err);
            return Err(err.into());
        }

        self.inventory = next;
        Ok(events)
    }

    fn persist(
        &self,
        events: &[InventoryEvent],
        next: &Inventory,
        touched: &mut Touched,
    ) -> Result<(), StoreError> {
        for event in events {
            match event {
                InventoryEvent::ItemCreated(_) | InventoryEvent::ItemUpdated { .. } => {
                    touched.active = true;
                    self.active_store.rewrite(next.active())?;
                }
                InventoryEvent::ItemSoftDeleted(record) => {
                    touched.deleted = true;
                    self.deleted_store.append(record)?;
                    touched.active = true;
                    self.active_store.rewrite(next.active())?;
                }
                InventoryEvent::ItemRestored(record) => {
                    touched.deleted = true;
                    self.deleted_store.rewrite(next.deleted())?;
                    touched.active = true;
                    self.active_store.append(record)?;
                }
                InventoryEvent::AllItemsRestored(records) => {
                    touched.active = true;
                    for record in records {
                        self.active_store.append(record)?;
                    }
                    touched.deleted = true;
                    self.deleted_store.rewrite(next.deleted())?;
                }
                InventoryEvent::ItemPurged(_) | InventoryEvent::TrashEmptied(_) => {
                    touched.deleted = true;
                    self.deleted_store.rewrite(next.deleted())?;
                }
            }
        }
        Ok(())
    }

    fn roll_back(&self, touched: &Touched, cause: &StoreError) {
        warn!(error = %cause, "store write failed, restoring stores from memory");
        if touched.active {
            if let Err(e) = self.active_store.rewrite(self.inventory.active()) {
                warn!(store = %self.active_store.describe(), error = %e, "active store not restored");
            }
        }
        if touched.deleted {
            if let Err(e) = self.deleted_store.rewrite(self.inventory.deleted()) {
                warn!(store = %self.deleted_store.describe(), error = %e, "deleted store not restored");
            }
        }
    }
}

fn unexpected(operation: &str, event: Option<InventoryEvent>) -> LifecycleError {
    let found = event.map(|e| e.event_type()).unwrap_or("nothing");
    DomainError::invariant(format!("{operation} produced {found}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;

    type Manager<'a> = LifecycleManager<&'a InMemoryRecordStore>;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn rec(name: &str, number: u32, item_type: ItemType) -> InventoryRecord {
        InventoryRecord::new(name, 5, ItemNumber::new(number), item_type, day())
    }

    fn n(value: u32) -> ItemNumber {
        ItemNumber::new(value)
    }

    fn new_item(name: &str, quantity: i64, item_type: ItemType) -> NewItem {
        NewItem {
            name: ItemName::parse(name).unwrap(),
            quantity,
            item_type,
            created_on: day(),
        }
    }

    fn manager<'a>(active: &'a InMemoryRecordStore, deleted: &'a InMemoryRecordStore) -> Manager<'a> {
        LifecycleManager::with_rng(active, deleted, StdRng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn create_allocates_in_range_and_rewrites_active() {
        let active = InMemoryRecordStore::new("active");
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        let record = mgr.create(new_item("Gold Vase", 5, ItemType::Vases)).unwrap();
        assert!(ItemType::Vases.contains(record.item_number()));
        assert_eq!(record.creation_date(), day());
        assert_eq!(active.snapshot(), vec![record]);
        assert_eq!(deleted.writes(), 0);
    }

    #[test]
    fn create_rejects_zero_quantity_without_writing() {
        let active = InMemoryRecordStore::new("active");
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        let err = mgr.create(new_item("Gold Vase", 0, ItemType::Vases)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(active.writes(), 0);
    }

    #[test]
    fn create_in_full_range_is_exhausted() {
        let full: Vec<_> = (100..200).map(|i| rec("Vase", i, ItemType::Vases)).collect();
        let active = InMemoryRecordStore::with_records("active", full);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        let err = mgr.create(new_item("One More", 1, ItemType::Vases)).unwrap_err();
        assert!(err.is_exhausted());
    }

    #[test]
    fn zero_quantity_in_full_range_is_a_validation_failure() {
        let full: Vec<_> = (100..200).map(|i| rec("Vase", i, ItemType::Vases)).collect();
        let active = InMemoryRecordStore::with_records("active", full);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        let err = mgr.create(new_item("One More", 0, ItemType::Vases)).unwrap_err();
        assert!(err.is_validation());
        assert!(!err.is_exhausted());
        assert_eq!(active.writes(), 0);
    }

    #[test]
    fn update_to_same_value_writes_nothing() {
        let active = InMemoryRecordStore::with_records("active", vec![rec("Gold Vase", 150, ItemType::Vases)]);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        for update in [
            FieldUpdate::Quantity(5),
            FieldUpdate::ItemNumber(n(150)),
            FieldUpdate::Name(ItemName::parse(" Gold   Vase ").unwrap()),
            FieldUpdate::ItemType(ItemType::Vases),
        ] {
            assert_eq!(mgr.update(n(150), update).unwrap(), UpdateOutcome::NoChangeDetected);
        }
        assert_eq!(active.writes(), 0);
    }

    #[test]
    fn update_to_duplicate_number_is_rejected() {
        let active = InMemoryRecordStore::with_records(
            "active",
            vec![rec("Gold Vase", 150, ItemType::Vases), rec("Bud Vase", 160, ItemType::Vases)],
        );
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        let err = mgr.update(n(150), FieldUpdate::ItemNumber(n(160))).unwrap_err();
        assert!(err.is_conflict());
        assert!(mgr.find_active(n(150)).is_some());
        assert_eq!(active.writes(), 0);
    }

    #[test]
    fn update_type_reallocates_number() {
        let active = InMemoryRecordStore::with_records("active", vec![rec("Gold Vase", 150, ItemType::Vases)]);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        let UpdateOutcome::Updated(record) = mgr.update(n(150), FieldUpdate::ItemType(ItemType::Greeneries)).unwrap()
        else {
            panic!("expected an update");
        };
        assert_eq!(record.item_type(), ItemType::Greeneries);
        assert!(ItemType::Greeneries.contains(record.item_number()));
        assert_eq!(active.snapshot(), vec![record]);
    }

    #[test]
    fn update_missing_number_is_not_found() {
        let active = InMemoryRecordStore::with_records("active", vec![rec("Gold Vase", 150, ItemType::Vases)]);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        assert!(mgr.update(n(151), FieldUpdate::Quantity(2)).unwrap_err().is_not_found());
        assert!(mgr.update(n(151), FieldUpdate::ItemType(ItemType::Vases)).unwrap_err().is_not_found());
    }

    #[test]
    fn soft_delete_then_restore_round_trips_the_record() {
        let original = rec("Gold Vase", 150, ItemType::Vases);
        let active = InMemoryRecordStore::with_records("active", vec![original.clone()]);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        mgr.soft_delete(n(150)).unwrap();
        assert!(active.snapshot().is_empty());
        assert_eq!(deleted.snapshot(), vec![original.clone()]);

        let restored = mgr.restore(n(150)).unwrap();
        assert_eq!(restored, original);
        assert_eq!(active.snapshot(), vec![original]);
        assert!(deleted.snapshot().is_empty());
    }

    #[test]
    fn purged_item_cannot_be_restored() {
        let active = InMemoryRecordStore::new("active");
        let deleted = InMemoryRecordStore::with_records("deleted", vec![rec("Ivy", 305, ItemType::Greeneries)]);
        let mut mgr = manager(&active, &deleted);

        mgr.purge(n(305)).unwrap();
        assert!(deleted.snapshot().is_empty());
        assert!(mgr.restore(n(305)).unwrap_err().is_not_found());
    }

    #[test]
    fn restore_all_and_purge_all_guard_empty_trash() {
        let active = InMemoryRecordStore::new("active");
        let deleted = InMemoryRecordStore::with_records(
            "deleted",
            vec![rec("Ivy", 305, ItemType::Greeneries), rec("Lace", 210, ItemType::TableRunners)],
        );
        let mut mgr = manager(&active, &deleted);

        assert_eq!(mgr.restore_all().unwrap().len(), 2);
        assert_eq!(active.snapshot().len(), 2);
        assert!(deleted.snapshot().is_empty());
        assert!(mgr.restore_all().unwrap_err().is_not_found());
        assert!(mgr.purge_all().unwrap_err().is_not_found());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let active = InMemoryRecordStore::with_records("active", vec![rec("Gold Vase", 150, ItemType::Vases)]);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        active.fail_writes(true);
        let err = mgr.create(new_item("Bud Vase", 2, ItemType::Vases)).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(mgr.active().len(), 1);
    }

    #[test]
    fn partial_write_failure_rolls_back_the_touched_store() {
        let original = rec("Gold Vase", 150, ItemType::Vases);
        let active = InMemoryRecordStore::with_records("active", vec![original.clone()]);
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        // The deleted store takes the append, then the active rewrite fails.
        active.fail_writes(true);
        let err = mgr.soft_delete(n(150)).unwrap_err();
        assert!(err.is_persistence());

        assert!(deleted.snapshot().is_empty());
        assert_eq!(active.snapshot(), vec![original.clone()]);
        assert_eq!(mgr.active(), &[original]);
        assert!(mgr.deleted().is_empty());
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let active = InMemoryRecordStore::new("active");
        let deleted = InMemoryRecordStore::new("deleted");
        let mut mgr = manager(&active, &deleted);

        active.append(&rec("Gold Vase", 150, ItemType::Vases)).unwrap();
        assert!(mgr.active().is_empty());
        mgr.reload().unwrap();
        assert_eq!(mgr.active().len(), 1);
    }
}
