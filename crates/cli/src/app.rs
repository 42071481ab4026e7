//! User actions behind the `decor` subcommands.
//!
//! Each action validates its raw input in the order the prompts would ask for it, runs
//! one lifecycle operation and returns the text to print. Refusals (bad input, unknown
//! item, empty collection) come back as errors carrying the user-facing message.

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::Serialize;

use decor_core::{DomainResult, ItemNumber};
use decor_infra::{
    CsvRecordStore, FieldUpdate, LifecycleError, LifecycleManager, NewItem, StoreConfig,
    UpdateOutcome, export_report,
};
use decor_inventory::report::{self, Listing};
use decor_inventory::validate;
use decor_inventory::{InventoryRecord, ItemName, SortMode};

/// Which field an update replaces, with the raw value as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateField {
    ItemNumber(String),
    ItemType(String),
    Name(String),
    Quantity(String),
}

impl UpdateField {
    fn no_change_message(&self) -> &'static str {
        match self {
            UpdateField::ItemNumber(_) => "New item number matches the current item number.",
            UpdateField::ItemType(_) => "New item type matches the current item type.",
            UpdateField::Name(_) => "New item name matches the current item name.",
            UpdateField::Quantity(_) => "New quantity matches the current quantity.",
        }
    }
}

#[derive(Serialize)]
struct Reply<'a, T: Serialize> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// Application state for one `decor` invocation.
pub struct App {
    manager: LifecycleManager<CsvRecordStore>,
    config: StoreConfig,
    json: bool,
}

fn refuse<T>(result: DomainResult<T>) -> anyhow::Result<T> {
    result.map_err(|e| anyhow!(e.message().to_string()))
}

/// Turn domain refusals into their plain message; keep store failures with context.
fn user_facing(err: LifecycleError) -> anyhow::Error {
    match err {
        LifecycleError::Domain(e) => anyhow!(e.message().to_string()),
        LifecycleError::Store(e) => anyhow::Error::new(e).context("inventory files could not be updated"),
    }
}

impl App {
    pub fn open(config: StoreConfig, json: bool) -> anyhow::Result<Self> {
        let manager = LifecycleManager::open_csv(&config).with_context(|| {
            format!("failed to load inventory from {}", config.data_dir.display())
        })?;
        Ok(Self {
            manager,
            config,
            json,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn reply<T: Serialize>(&self, message: &str, data: Option<T>) -> anyhow::Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(&Reply { message, data })?);
        }
        Ok(message.to_string())
    }

    fn records_json(&self, records: &[InventoryRecord]) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    fn parse_number(&self, raw: &str) -> anyhow::Result<ItemNumber> {
        refuse(validate::parse_item_number(raw))
    }

    pub fn list(&self) -> anyhow::Result<String> {
        let active = self.manager.active();
        if self.json {
            return self.records_json(active);
        }
        if active.is_empty() {
            return Ok("There are no items in the inventory to display.".to_string());
        }
        Ok(report::render_listing(Listing::Active, active))
    }

    pub fn deleted(&self) -> anyhow::Result<String> {
        let deleted = self.manager.deleted();
        if self.json {
            return self.records_json(deleted);
        }
        if deleted.is_empty() {
            return Ok("There are no deleted items to display.".to_string());
        }
        Ok(report::render_listing(Listing::Deleted, deleted))
    }

    pub fn create(&mut self, name: &str, quantity: &str, item_type: &str) -> anyhow::Result<String> {
        let name = refuse(ItemName::parse(name))?;
        let quantity = refuse(validate::parse_quantity(quantity).and_then(validate::require_positive_quantity))?;
        let item_type = refuse(validate::parse_item_type(item_type))?;

        let record = self
            .manager
            .create(NewItem::new(name, quantity, item_type))
            .map_err(user_facing)?;
        self.reply("Item Created Successfully!", Some(record))
    }

    pub fn update(&mut self, item_number: &str, field: UpdateField) -> anyhow::Result<String> {
        if self.manager.active().is_empty() {
            return Err(anyhow!("No Items to Update"));
        }
        let item_number = self.parse_number(item_number)?;
        let update = match &field {
            UpdateField::ItemNumber(raw) => FieldUpdate::ItemNumber(self.parse_number(raw)?),
            UpdateField::ItemType(raw) => FieldUpdate::ItemType(refuse(validate::parse_item_type(raw))?),
            UpdateField::Name(raw) => {
                let name = refuse(validate::normalize_name(raw))?;
                if self.manager.find_active(item_number).is_some_and(|r| r.name() == name) {
                    return self.no_change(&field);
                }
                FieldUpdate::Name(refuse(ItemName::parse(&name))?)
            }
            UpdateField::Quantity(raw) => FieldUpdate::Quantity(refuse(validate::parse_quantity(raw))?),
        };

        match self.manager.update(item_number, update).map_err(user_facing)? {
            UpdateOutcome::Updated(record) => self.reply("Item Updated Successfully!", Some(record)),
            UpdateOutcome::NoChangeDetected => self.no_change(&field),
        }
    }

    fn no_change(&self, field: &UpdateField) -> anyhow::Result<String> {
        let message = format!("No Change Detected: {}", field.no_change_message());
        self.reply::<InventoryRecord>(&message, None)
    }

    pub fn delete(&mut self, item_number: &str) -> anyhow::Result<String> {
        if self.manager.active().is_empty() {
            return Err(anyhow!("No Items to Delete"));
        }
        let item_number = self.parse_number(item_number)?;
        let record = self.manager.soft_delete(item_number).map_err(user_facing)?;
        self.reply("Item Deleted Successfully!", Some(record))
    }

    pub fn restore(&mut self, item_number: &str) -> anyhow::Result<String> {
        if self.manager.deleted().is_empty() {
            return Err(anyhow!("No Items to Restore"));
        }
        let item_number = self.parse_number(item_number)?;
        let record = self.manager.restore(item_number).map_err(user_facing)?;
        self.reply("Item restored successfully!", Some(record))
    }

    pub fn restore_all(&mut self) -> anyhow::Result<String> {
        let records = self.manager.restore_all().map_err(user_facing)?;
        self.reply("All items restored successfully!", Some(records))
    }

    pub fn purge(&mut self, item_number: &str) -> anyhow::Result<String> {
        if self.manager.deleted().is_empty() {
            return Err(anyhow!("Nothing to Permanently Delete"));
        }
        let item_number = self.parse_number(item_number)?;
        let record = self.manager.purge(item_number).map_err(user_facing)?;
        self.reply("Item Permanently Deleted Successfully!", Some(record))
    }

    pub fn purge_all(&mut self) -> anyhow::Result<String> {
        let records = self.manager.purge_all().map_err(user_facing)?;
        self.reply("All Items Deleted Successfully!", Some(records))
    }

    /// Report text for stdout.
    pub fn report_text(&self, mode: SortMode) -> anyhow::Result<String> {
        let active = self.manager.active();
        if active.is_empty() {
            return Err(anyhow!("No items to generate report for!"));
        }
        if self.json {
            return Ok(serde_json::to_string_pretty(&self.manager.report(mode))?);
        }
        Ok(report::render_report(active, mode))
    }

    /// Save the report under the configured report directory, stamped with `date`.
    pub fn save_report(&self, mode: SortMode, date: NaiveDate) -> anyhow::Result<String> {
        let path: PathBuf =
            export_report(self.config.report_dir(), self.manager.active(), mode, date).map_err(user_facing)?;
        let message = format!("Report generated and saved to:\n{}", path.display());
        self.reply(&message, Some(path))
    }
}
