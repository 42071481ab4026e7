//! Active/deleted lifecycle of inventory records.
//!
//! `Inventory` owns both collections. A record lives in exactly one of them: created
//! into `active`, moved to `deleted` by a soft delete, then either moved back by a
//! restore or dropped by a purge. Commands are decided by `handle` (pure) and take
//! effect through `apply`, so the caller can persist before committing.

use chrono::NaiveDate;

use decor_core::{Aggregate, DomainError, DomainResult, ItemNumber};

use crate::item::{InventoryRecord, ItemName, ItemType};
use crate::validate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    active: Vec<InventoryRecord>,
    deleted: Vec<InventoryRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from previously persisted collections.
    pub fn from_parts(active: Vec<InventoryRecord>, deleted: Vec<InventoryRecord>) -> Self {
        Self { active, deleted }
    }

    pub fn active(&self) -> &[InventoryRecord] {
        &self.active
    }

    pub fn deleted(&self) -> &[InventoryRecord] {
        &self.deleted
    }

    pub fn find_active(&self, item_number: ItemNumber) -> Option<&InventoryRecord> {
        self.active.iter().find(|r| r.item_number() == item_number)
    }

    pub fn find_deleted(&self, item_number: ItemNumber) -> Option<&InventoryRecord> {
        self.deleted.iter().find(|r| r.item_number() == item_number)
    }
}

/// Command: CreateItem.
///
/// The item number is allocated by the caller (see [`crate::allocate_item_number`]);
/// `created_on` is the run date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateItem {
    pub name: ItemName,
    pub quantity: i64,
    pub item_type: ItemType,
    pub item_number: ItemNumber,
    pub created_on: NaiveDate,
}

/// A single-field replacement on an active record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    ItemNumber(ItemNumber),
    /// Type changes move the record into the new type's number range.
    ItemType {
        item_type: ItemType,
        item_number: ItemNumber,
    },
    Name(String),
    Quantity(i64),
}

/// Command: UpdateItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateItem {
    pub item_number: ItemNumber,
    pub change: FieldChange,
}

/// Command: SoftDeleteItem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftDeleteItem {
    pub item_number: ItemNumber,
}

/// Command: RestoreItem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreItem {
    pub item_number: ItemNumber,
}

/// Command: PurgeItem (permanent delete).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeItem {
    pub item_number: ItemNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCommand {
    CreateItem(CreateItem),
    UpdateItem(UpdateItem),
    SoftDeleteItem(SoftDeleteItem),
    RestoreItem(RestoreItem),
    RestoreAll,
    PurgeItem(PurgeItem),
    PurgeAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemCreated(InventoryRecord),
    ItemUpdated {
        item_number: ItemNumber,
        change: FieldChange,
    },
    ItemSoftDeleted(InventoryRecord),
    ItemRestored(InventoryRecord),
    AllItemsRestored(Vec<InventoryRecord>),
    ItemPurged(InventoryRecord),
    TrashEmptied(Vec<InventoryRecord>),
}

impl InventoryEvent {
    /// Stable event name (e.g. "inventory.item.created").
    pub fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemCreated(_) => "inventory.item.created",
            InventoryEvent::ItemUpdated { .. } => "inventory.item.updated",
            InventoryEvent::ItemSoftDeleted(_) => "inventory.item.soft_deleted",
            InventoryEvent::ItemRestored(_) => "inventory.item.restored",
            InventoryEvent::AllItemsRestored(_) => "inventory.trash.restored",
            InventoryEvent::ItemPurged(_) => "inventory.item.purged",
            InventoryEvent::TrashEmptied(_) => "inventory.trash.emptied",
        }
    }
}

fn take_first(list: &mut Vec<InventoryRecord>, item_number: ItemNumber) -> Option<InventoryRecord> {
    list.iter()
        .position(|r| r.item_number() == item_number)
        .map(|idx| list.remove(idx))
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemCreated(record) => {
                self.active.push(record.clone());
            }
            InventoryEvent::ItemUpdated { item_number, change } => {
                let Some(record) = self.active.iter_mut().find(|r| r.item_number() == *item_number)
                else {
                    return;
                };
                match change {
                    FieldChange::ItemNumber(n) => record.set_item_number(*n),
                    FieldChange::ItemType {
                        item_type,
                        item_number,
                    } => {
                        record.set_item_type(*item_type);
                        record.set_item_number(*item_number);
                    }
                    FieldChange::Name(name) => record.set_name(name.clone()),
                    FieldChange::Quantity(q) => record.set_quantity(*q),
                }
            }
            InventoryEvent::ItemSoftDeleted(record) => {
                if let Some(moved) = take_first(&mut self.active, record.item_number()) {
                    self.deleted.push(moved);
                }
            }
            InventoryEvent::ItemRestored(record) => {
                if let Some(moved) = take_first(&mut self.deleted, record.item_number()) {
                    self.active.push(moved);
                }
            }
            InventoryEvent::AllItemsRestored(_) => {
                self.active.append(&mut self.deleted);
            }
            InventoryEvent::ItemPurged(record) => {
                take_first(&mut self.deleted, record.item_number());
            }
            InventoryEvent::TrashEmptied(_) => {
                self.deleted.clear();
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::CreateItem(cmd) => self.handle_create(cmd),
            InventoryCommand::UpdateItem(cmd) => self.handle_update(cmd),
            InventoryCommand::SoftDeleteItem(cmd) => self.handle_soft_delete(cmd),
            InventoryCommand::RestoreItem(cmd) => self.handle_restore(cmd),
            InventoryCommand::RestoreAll => self.handle_restore_all(),
            InventoryCommand::PurgeItem(cmd) => self.handle_purge(cmd),
            InventoryCommand::PurgeAll => self.handle_purge_all(),
        }
    }
}

impl Inventory {
    fn require_active(&self, empty_msg: &str, item_number: ItemNumber) -> DomainResult<&InventoryRecord> {
        if self.active.is_empty() {
            return Err(DomainError::not_found(empty_msg));
        }
        self.find_active(item_number).ok_or_else(|| {
            DomainError::not_found(format!("Item number {item_number} does not exist"))
        })
    }

    fn require_deleted(&self, empty_msg: &str, item_number: ItemNumber) -> DomainResult<&InventoryRecord> {
        if self.deleted.is_empty() {
            return Err(DomainError::not_found(empty_msg));
        }
        self.find_deleted(item_number).ok_or_else(|| {
            DomainError::not_found(format!("Item number {item_number} does not exist."))
        })
    }

    /// Active records other than the one numbered `except`.
    fn others<'a>(&'a self, except: ItemNumber) -> impl Iterator<Item = &'a InventoryRecord> + 'a {
        self.active.iter().filter(move |r| r.item_number() != except)
    }

    fn ensure_restorable(&self, record: &InventoryRecord) -> DomainResult<()> {
        if self.find_active(record.item_number()).is_some() {
            return Err(DomainError::conflict(format!(
                "Item number {} is already used by an active item",
                record.item_number()
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateItem) -> DomainResult<Vec<InventoryEvent>> {
        validate::require_positive_quantity(cmd.quantity)?;
        if !cmd.item_type.contains(cmd.item_number) {
            return Err(DomainError::invariant(format!(
                "item number {} outside range {} for '{}'",
                cmd.item_number,
                cmd.item_type.range_label(),
                cmd.item_type
            )));
        }
        validate::check_not_duplicate(&self.active, cmd.item_number)?;

        Ok(vec![InventoryEvent::ItemCreated(InventoryRecord::new(
            cmd.name.as_str(),
            cmd.quantity,
            cmd.item_number,
            cmd.item_type,
            cmd.created_on,
        ))])
    }

    fn handle_update(&self, cmd: &UpdateItem) -> DomainResult<Vec<InventoryEvent>> {
        let current = self.require_active("No Items to Update", cmd.item_number)?;

        let unchanged = match &cmd.change {
            FieldChange::ItemNumber(n) => {
                validate::check_number_in_range(current.item_type(), *n)?;
                if *n == current.item_number() {
                    true
                } else {
                    if self.others(current.item_number()).any(|r| r.item_number() == *n) {
                        return Err(DomainError::conflict("The entered item number already exists!"));
                    }
                    false
                }
            }
            FieldChange::ItemType {
                item_type,
                item_number,
            } => {
                if *item_type == current.item_type() {
                    true
                } else {
                    if !item_type.contains(*item_number) {
                        return Err(DomainError::invariant(format!(
                            "item number {item_number} outside range {} for '{item_type}'",
                            item_type.range_label()
                        )));
                    }
                    if self.others(current.item_number()).any(|r| r.item_number() == *item_number) {
                        return Err(DomainError::conflict("The entered item number already exists!"));
                    }
                    false
                }
            }
            FieldChange::Name(name) => name == current.name(),
            FieldChange::Quantity(q) => *q == current.quantity(),
        };

        if unchanged {
            return Ok(vec![]);
        }

        Ok(vec![InventoryEvent::ItemUpdated {
            item_number: cmd.item_number,
            change: cmd.change.clone(),
        }])
    }

    fn handle_soft_delete(&self, cmd: &SoftDeleteItem) -> DomainResult<Vec<InventoryEvent>> {
        let record = self.require_active("No Items to Delete", cmd.item_number)?;
        Ok(vec![InventoryEvent::ItemSoftDeleted(record.clone())])
    }

    fn handle_restore(&self, cmd: &RestoreItem) -> DomainResult<Vec<InventoryEvent>> {
        let record = self.require_deleted("No Items to Restore", cmd.item_number)?;
        self.ensure_restorable(record)?;
        Ok(vec![InventoryEvent::ItemRestored(record.clone())])
    }

    fn handle_restore_all(&self) -> DomainResult<Vec<InventoryEvent>> {
        if self.deleted.is_empty() {
            return Err(DomainError::not_found("No Items to Restore"));
        }
        for (idx, record) in self.deleted.iter().enumerate() {
            self.ensure_restorable(record)?;
            if self.deleted[..idx]
                .iter()
                .any(|r| r.item_number() == record.item_number())
            {
                return Err(DomainError::conflict(format!(
                    "Item number {} appears more than once in the deleted items",
                    record.item_number()
                )));
            }
        }
        Ok(vec![InventoryEvent::AllItemsRestored(self.deleted.clone())])
    }

    fn handle_purge(&self, cmd: &PurgeItem) -> DomainResult<Vec<InventoryEvent>> {
        let record = self.require_deleted("Nothing to Permanently Delete", cmd.item_number)?;
        Ok(vec![InventoryEvent::ItemPurged(record.clone())])
    }

    fn handle_purge_all(&self) -> DomainResult<Vec<InventoryEvent>> {
        if self.deleted.is_empty() {
            return Err(DomainError::not_found("Nothing to Permanently Delete"));
        }
        Ok(vec![InventoryEvent::TrashEmptied(self.deleted.clone())])
    }
}
