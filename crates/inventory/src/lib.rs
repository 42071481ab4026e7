//! Inventory domain module.
//!
//! This crate contains the business rules for decor rental inventory, implemented
//! purely as deterministic domain logic (no IO, no storage). Randomness is limited to
//! the item number allocator, which takes its generator from the caller.

pub mod allocator;
pub mod inventory;
pub mod item;
pub mod report;
pub mod validate;

pub use allocator::allocate_item_number;
pub use inventory::{
    CreateItem, FieldChange, Inventory, InventoryCommand, InventoryEvent, PurgeItem, RestoreItem,
    SoftDeleteItem, UpdateItem,
};
pub use item::{InventoryRecord, ItemName, ItemType};
pub use report::{Listing, ReportSection, SortMode};
