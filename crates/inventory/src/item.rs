use core::ops::Range;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use decor_core::{DomainError, DomainResult, Entity, ItemNumber};

use crate::validate;

/// Closed set of decor categories.
///
/// Variants are declared in alphabetical order of their display names, so `Ord`
/// matches the order grouped views list them in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "Greeneries")]
    Greeneries,
    #[serde(rename = "Table Runners")]
    TableRunners,
    #[serde(rename = "Vases")]
    Vases,
}

impl ItemType {
    /// Types in the order the create prompt offers them.
    pub const ALL: [ItemType; 3] = [ItemType::Vases, ItemType::TableRunners, ItemType::Greeneries];

    /// Number of item numbers reserved per type.
    pub const RANGE_SIZE: u32 = 100;

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Vases => "Vases",
            ItemType::TableRunners => "Table Runners",
            ItemType::Greeneries => "Greeneries",
        }
    }

    /// First item number of the sub-range reserved for this type.
    pub fn base(&self) -> u32 {
        match self {
            ItemType::Vases => 100,
            ItemType::TableRunners => 200,
            ItemType::Greeneries => 300,
        }
    }

    /// Half-open range of item numbers reserved for this type.
    pub fn number_range(&self) -> Range<u32> {
        self.base()..self.base() + Self::RANGE_SIZE
    }

    pub fn contains(&self, number: ItemNumber) -> bool {
        self.number_range().contains(&number.get())
    }

    /// Human-readable inclusive range, e.g. `"100 - 199"`.
    pub fn range_label(&self) -> String {
        let range = self.number_range();
        format!("{} - {}", range.start, range.end - 1)
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = DomainError;

    /// Accepts the display name exactly as stored (`"Table Runners"`), and for typed
    /// input also any casing with `-`/`_` in place of spaces (`"table-runners"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(t) = ItemType::ALL.iter().find(|t| t.as_str() == s) {
            return Ok(*t);
        }
        let folded = s.trim().replace(['-', '_'], " ").to_ascii_lowercase();
        ItemType::ALL
            .iter()
            .find(|t| t.as_str().to_ascii_lowercase() == folded)
            .copied()
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Unknown item type '{s}'! Choose one of: Vases, Table Runners, Greeneries."
                ))
            })
    }
}

/// A validated item name: whitespace-normalized, non-empty, `[A-Za-z0-9\s]+`.
///
/// Only constructible through [`ItemName::parse`], so holding one means the name
/// passed the name validators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemName(String);

impl ItemName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        validate::validate_name(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One inventory record.
///
/// The record enforces nothing itself; validation happens before commands reach the
/// [`Inventory`](crate::Inventory) aggregate. Names loaded from a store are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    name: String,
    quantity: i64,
    item_number: ItemNumber,
    item_type: ItemType,
    creation_date: NaiveDate,
}

impl InventoryRecord {
    pub fn new(
        name: impl Into<String>,
        quantity: i64,
        item_number: ItemNumber,
        item_type: ItemType,
        creation_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            item_number,
            item_type,
            creation_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn item_number(&self) -> ItemNumber {
        self.item_number
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn creation_date(&self) -> NaiveDate {
        self.creation_date
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    pub(crate) fn set_item_number(&mut self, item_number: ItemNumber) {
        self.item_number = item_number;
    }

    pub(crate) fn set_item_type(&mut self, item_type: ItemType) {
        self.item_type = item_type;
    }
}

impl Entity for InventoryRecord {
    type Id = ItemNumber;

    fn id(&self) -> &Self::Id {
        &self.item_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ranges_are_disjoint_hundreds() {
        assert_eq!(ItemType::Vases.number_range(), 100..200);
        assert_eq!(ItemType::TableRunners.number_range(), 200..300);
        assert_eq!(ItemType::Greeneries.number_range(), 300..400);
        assert!(ItemType::Vases.contains(ItemNumber::new(199)));
        assert!(!ItemType::Vases.contains(ItemNumber::new(200)));
    }

    #[test]
    fn range_label_is_inclusive() {
        assert_eq!(ItemType::TableRunners.range_label(), "200 - 299");
    }

    #[test]
    fn parses_display_name_and_folded_forms() {
        assert_eq!("Table Runners".parse::<ItemType>().unwrap(), ItemType::TableRunners);
        assert_eq!("table-runners".parse::<ItemType>().unwrap(), ItemType::TableRunners);
        assert_eq!("VASES".parse::<ItemType>().unwrap(), ItemType::Vases);
        assert!(matches!(
            "Chairs".parse::<ItemType>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn type_order_is_alphabetical_by_display_name() {
        let mut types = ItemType::ALL.to_vec();
        types.sort();
        let names: Vec<_> = types.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["Greeneries", "Table Runners", "Vases"]);
    }

    #[test]
    fn item_name_parse_normalizes_whitespace() {
        let name = ItemName::parse("  Gold \t  Vase ").unwrap();
        assert_eq!(name.as_str(), "Gold Vase");
    }

    #[test]
    fn record_identity_is_its_item_number() {
        let record = InventoryRecord::new(
            "Gold Vase",
            5,
            ItemNumber::new(150),
            ItemType::Vases,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        assert_eq!(*record.id(), ItemNumber::new(150));
    }
}
