//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Item number of an inventory record.
///
/// Unique within the active collection; the valid range depends on the item type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemNumber(u32);

impl ItemNumber {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ItemNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for ItemNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ItemNumber> for u32 {
    fn from(value: ItemNumber) -> Self {
        value.0
    }
}

impl FromStr for ItemNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = u32::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("ItemNumber {s:?}: {e}")))?;
        Ok(Self(value))
    }
}
