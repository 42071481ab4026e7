//! Input validators.
//!
//! Pure predicates over user-supplied strings. Each returns the parsed value or a
//! `DomainError` carrying the message shown to the user. Callers run them in order and
//! stop at the first rejection, before any lifecycle operation is invoked.
//!
//! Numeric inputs accept ASCII digits only, so a negative quantity can never be typed
//! even though the record model stores one.

use std::sync::LazyLock;

use regex::Regex;

use decor_core::{DomainError, DomainResult, ItemNumber};

use crate::item::{InventoryRecord, ItemType};

// `(?-u)` keeps the classes ASCII: `\s` is space, tab, newline, vertical tab, form feed and CR.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)\s+").expect("WHITESPACE_RUN is a valid regex literal"));

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^\d+$").expect("DIGITS is a valid regex literal"));

static NAME_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^[A-Za-z0-9\s]+$").expect("NAME_CHARSET is a valid regex literal")
});

/// Collapse runs of whitespace into a single space and trim both ends.
pub fn normalize_whitespace(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input, " ").trim_matches(' ').to_string()
}

fn is_digits(input: &str) -> bool {
    DIGITS.is_match(input)
}

/// Alphanumerics and whitespace only.
fn is_name_charset(input: &str) -> bool {
    NAME_CHARSET.is_match(input)
}

/// Normalize and reject empty input.
pub fn require_non_empty(input: &str, message: &str) -> DomainResult<String> {
    let normalized = normalize_whitespace(input);
    if normalized.is_empty() {
        return Err(DomainError::validation(message));
    }
    Ok(normalized)
}

/// Name normalized and non-empty, charset not yet checked.
pub fn normalize_name(raw: &str) -> DomainResult<String> {
    require_non_empty(raw, "Item Name cannot be empty!")
}

/// Name: normalized, non-empty, alphanumerics and spaces only.
pub fn validate_name(raw: &str) -> DomainResult<String> {
    let name = normalize_name(raw)?;
    if !is_name_charset(&name) {
        return Err(DomainError::validation(
            "Invalid characters in item name! Only alphanumeric characters (A-Z, a-z) or digits (0-9).",
        ));
    }
    Ok(name)
}

/// Quantity as typed by the user: digits only.
pub fn parse_quantity(raw: &str) -> DomainResult<i64> {
    let quantity = require_non_empty(raw, "Quantity cannot be empty!")?;
    if !is_digits(&quantity) {
        return Err(DomainError::validation(
            "Quantity input must contain only numbers! (ex: 1, 2, 5, 10, 50, 100)",
        ));
    }
    quantity
        .parse::<i64>()
        .map_err(|_| DomainError::validation("Invalid input! Only numeric input is allowed."))
}

/// Quantity at creation time must be at least one.
pub fn require_positive_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity >= 1 {
        Ok(quantity)
    } else {
        Err(DomainError::validation(
            "Quantity must be a positive number! (ex: 1, 2, 5, 10, 50, 100)",
        ))
    }
}

/// Item number as typed by the user: digits only.
pub fn parse_item_number(raw: &str) -> DomainResult<ItemNumber> {
    let number = require_non_empty(raw, "Item Number cannot be empty!")?;
    if !is_digits(&number) {
        return Err(DomainError::validation(
            "The item number must contain only numbers!",
        ));
    }
    number
        .parse::<ItemNumber>()
        .map_err(|_| DomainError::validation("Invalid entry!"))
}

pub fn parse_item_type(raw: &str) -> DomainResult<ItemType> {
    raw.parse()
}

/// The number must lie in the sub-range reserved for `item_type`.
pub fn check_number_in_range(item_type: ItemType, number: ItemNumber) -> DomainResult<()> {
    if item_type.contains(number) {
        return Ok(());
    }
    Err(DomainError::validation(format!(
        "Invalid item number for the selected item type! The item number for '{}' must be between {}.",
        item_type,
        item_type.range_label()
    )))
}

/// The number must not be held by any record in `active`.
pub fn check_not_duplicate(active: &[InventoryRecord], number: ItemNumber) -> DomainResult<()> {
    if active.iter().any(|r| r.item_number() == number) {
        return Err(DomainError::conflict("The entered item number already exists!"));
    }
    Ok(())
}
