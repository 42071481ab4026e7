//! Item number allocation for newly created records.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use decor_core::{DomainError, DomainResult, ItemNumber};

use crate::item::{InventoryRecord, ItemType};

/// Random draws attempted before falling back to picking from the free slots.
pub const MAX_DRAWS: usize = 1_000;

/// Draw a fresh item number in `item_type`'s range.
///
/// Draws `base + [0, 100)` uniformly until the value is not held by an active record.
/// Any active record whose number falls in the range counts as occupying it, whatever
/// its type. When all 100 slots are taken this fails with `DomainError::Exhausted`
/// instead of drawing forever.
pub fn allocate_item_number<R: Rng + ?Sized>(
    item_type: ItemType,
    active: &[InventoryRecord],
    rng: &mut R,
) -> DomainResult<ItemNumber> {
    let range = item_type.number_range();
    let taken: HashSet<u32> = active
        .iter()
        .map(|r| r.item_number().get())
        .filter(|n| range.contains(n))
        .collect();

    if taken.len() as u32 >= ItemType::RANGE_SIZE {
        return Err(DomainError::exhausted(format!(
            "all item numbers for '{}' ({}) are in use",
            item_type,
            item_type.range_label()
        )));
    }

    for _ in 0..MAX_DRAWS {
        let candidate = item_type.base() + rng.gen_range(0..ItemType::RANGE_SIZE);
        if !taken.contains(&candidate) {
            return Ok(ItemNumber::new(candidate));
        }
    }

    // Nearly full range: pick uniformly among what is left.
    let free: Vec<u32> = range.filter(|n| !taken.contains(n)).collect();
    free.choose(rng)
        .copied()
        .map(ItemNumber::new)
        .ok_or_else(|| DomainError::exhausted(format!("no free item number for '{item_type}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn record(number: u32, item_type: ItemType) -> InventoryRecord {
        InventoryRecord::new(
            "Item",
            1,
            ItemNumber::new(number),
            item_type,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn full_range(item_type: ItemType) -> Vec<InventoryRecord> {
        item_type.number_range().map(|n| record(n, item_type)).collect()
    }

    #[test]
    fn allocates_within_type_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for item_type in ItemType::ALL {
            let n = allocate_item_number(item_type, &[], &mut rng).unwrap();
            assert!(item_type.contains(n), "{item_type}: {n}");
        }
    }

    #[test]
    fn last_free_slot_is_found() {
        let mut active = full_range(ItemType::Vases);
        active.retain(|r| r.item_number() != ItemNumber::new(142));
        let mut rng = StdRng::seed_from_u64(1);
        let n = allocate_item_number(ItemType::Vases, &active, &mut rng).unwrap();
        assert_eq!(n, ItemNumber::new(142));
    }

    #[test]
    fn full_range_is_exhausted() {
        let active = full_range(ItemType::Greeneries);
        let mut rng = StdRng::seed_from_u64(3);
        let err = allocate_item_number(ItemType::Greeneries, &active, &mut rng).unwrap_err();
        assert!(matches!(err, DomainError::Exhausted(_)));
    }

    #[test]
    fn other_full_ranges_do_not_block() {
        let active = full_range(ItemType::Vases);
        let mut rng = StdRng::seed_from_u64(3);
        let n = allocate_item_number(ItemType::TableRunners, &active, &mut rng).unwrap();
        assert!(ItemType::TableRunners.contains(n));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the allocated number is in range and was not already active.
            #[test]
            fn allocated_number_is_fresh_and_in_range(
                offsets in proptest::collection::hash_set(0u32..100, 0..99),
                seed in any::<u64>(),
            ) {
                let active: Vec<_> = offsets
                    .iter()
                    .map(|o| record(ItemType::TableRunners.base() + o, ItemType::TableRunners))
                    .collect();
                let mut rng = StdRng::seed_from_u64(seed);
                let n = allocate_item_number(ItemType::TableRunners, &active, &mut rng).unwrap();

                prop_assert!(ItemType::TableRunners.contains(n));
                prop_assert!(active.iter().all(|r| r.item_number() != n));
            }
        }
    }
}
