//! Report builder and text listings.
//!
//! Records are grouped by type (types in alphabetical order) and ordered inside each
//! group according to a [`SortMode`]. Rendering produces the plain-text layouts the
//! shell prints or saves.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use decor_core::DomainError;

use crate::item::{InventoryRecord, ItemType};

/// Names longer than this are truncated in listings.
const LISTING_NAME_LIMIT: usize = 35;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// By name within each type.
    #[default]
    Alphabetical,
    /// By quantity, largest first.
    ByQuantity,
    /// By item number, smallest first.
    ByItemNumber,
}

impl SortMode {
    pub fn title(&self) -> &'static str {
        match self {
            SortMode::Alphabetical => "Inventory Report",
            SortMode::ByQuantity => "Inventory Report (Sorted by Quantity)",
            SortMode::ByItemNumber => "Inventory Report (Sorted by Item Number)",
        }
    }
}

impl core::str::FromStr for SortMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alphabetical" | "alphabetically" | "name" => Ok(SortMode::Alphabetical),
            "quantity" | "by-quantity" => Ok(SortMode::ByQuantity),
            "number" | "item-number" | "by-item-number" => Ok(SortMode::ByItemNumber),
            other => Err(DomainError::validation(format!(
                "Unknown sort mode '{other}' (expected alphabetical, quantity or number)"
            ))),
        }
    }
}

/// All records of one type, already ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub item_type: ItemType,
    pub records: Vec<InventoryRecord>,
}

fn group_by_type(records: &[InventoryRecord]) -> BTreeMap<ItemType, Vec<InventoryRecord>> {
    let mut groups: BTreeMap<ItemType, Vec<InventoryRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.item_type()).or_default().push(record.clone());
    }
    groups
}

/// Group by type, then order each group by `mode`. Sorting is stable, so ties keep
/// collection order.
pub fn build(records: &[InventoryRecord], mode: SortMode) -> Vec<ReportSection> {
    group_by_type(records)
        .into_iter()
        .map(|(item_type, mut records)| {
            match mode {
                SortMode::Alphabetical => records.sort_by(|a, b| a.name().cmp(b.name())),
                SortMode::ByQuantity => records.sort_by(|a, b| b.quantity().cmp(&a.quantity())),
                SortMode::ByItemNumber => records.sort_by_key(|r| r.item_number()),
            }
            ReportSection { item_type, records }
        })
        .collect()
}

/// Full report text for `mode`.
pub fn render_report(records: &[InventoryRecord], mode: SortMode) -> String {
    let title = mode.title();
    let mut out = format!("{title}\n{}\n\n", "-".repeat(title.len()));

    for section in build(records, mode) {
        out.push_str(&format!("Type: {}\n", section.item_type));
        out.push_str(&format!(
            "{:<5} {:<20} {:<65} {:<15} {:<25}\n",
            "#", "Item Number", "Item Name", "Quantity", "Creation Date"
        ));
        for (idx, record) in section.records.iter().enumerate() {
            out.push_str(&format!(
                "{:<5} {:<20} {:<65} {:<15} {:<25}\n",
                idx + 1,
                record.item_number(),
                record.name(),
                record.quantity(),
                record.creation_date().format("%B %-d, %Y")
            ));
        }
        out.push('\n');
    }
    out
}

/// File name the report is saved under: `inventory_report_YYYYMMDD.txt`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("inventory_report_{}.txt", date.format("%Y%m%d"))
}

/// Which collection a listing shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Active items, sorted by name within each type.
    Active,
    /// Deleted items, in the order they were deleted.
    Deleted,
}

impl Listing {
    fn title(&self) -> &'static str {
        match self {
            Listing::Active => "Inventory Report",
            Listing::Deleted => "Deleted Items Report",
        }
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > LISTING_NAME_LIMIT {
        let head: String = name.chars().take(LISTING_NAME_LIMIT - 3).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Compact on-screen listing of a collection.
pub fn render_listing(kind: Listing, records: &[InventoryRecord]) -> String {
    let title = kind.title();
    let mut out = format!(" {title}\n {}\n\n", "-".repeat(title.len() + 4));

    for (item_type, mut records) in group_by_type(records) {
        if kind == Listing::Active {
            records.sort_by(|a, b| a.name().cmp(b.name()));
        }
        out.push_str(&format!(" Type: {item_type}\n"));
        out.push_str(&format!(
            "{:<7} {:<14} {:<55} {:<15} {:<25}\n",
            " ", "Item #", "Item Name", "Qty", "Date"
        ));
        for (idx, record) in records.iter().enumerate() {
            out.push_str(&format!(
                " {:<5} {:<15} {:<45} {:<15} {:<25}\n",
                idx + 1,
                record.item_number(),
                truncate_name(record.name()),
                record.quantity(),
                record.creation_date().format("%m/%d/%y")
            ));
        }
        out.push('\n');
    }
    out
}
