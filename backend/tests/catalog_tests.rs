//! Catalog tests
//!
//! Tests for product and category maintenance including:
//! - Category id sets are deduplicated without depending on input order
//! - A category with linked products cannot be deleted
//! - Product field validation
//!
//! The stored round trip (create, read back, replace) runs against
//! PostgreSQL in `backend/src/services/catalog_db_tests.rs`.

use std::collections::BTreeSet;

use proptest::prelude::*;
use shared::validation::{
    check_category_deletable, normalize_category_ids, validate_min_stock, validate_name,
    validate_product_code,
};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Deletion is refused while any product still links the category
    #[test]
    fn test_linked_category_not_deletable() {
        assert_err!(check_category_deletable(2));
        assert_err!(check_category_deletable(1));
        assert_ok!(check_category_deletable(0));
    }

    /// Repeated ids collapse to one link, first occurrence kept in place
    #[test]
    fn test_duplicate_ids_collapse() {
        let (a, b, c) = (Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3));
        assert_eq!(normalize_category_ids(&[c, a, c, b, a]), vec![c, a, b]);
    }

    /// Codes and names are trimmed before the emptiness check
    #[test]
    fn test_product_fields() {
        assert_ok!(validate_product_code("HERR001"));
        assert_err!(validate_product_code("   "));
        assert_ok!(validate_name("Martillo"));
        assert_err!(validate_name(""));
        assert_ok!(validate_min_stock(&0));
        assert_err!(validate_min_stock(&-1));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for category ids drawn from a small pool so duplicates occur
    fn category_ids_strategy() -> impl Strategy<Value = Vec<Uuid>> {
        prop::collection::vec((1u128..=8).prop_map(Uuid::from_u128), 0..16)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The links written for a request cover exactly the requested set,
        /// whatever order it was sent in
        #[test]
        fn prop_links_cover_requested_set(ids in category_ids_strategy()) {
            let expected: BTreeSet<Uuid> = ids.iter().copied().collect();

            let links: BTreeSet<Uuid> = normalize_category_ids(&ids).into_iter().collect();
            prop_assert_eq!(&links, &expected);

            let mut reversed = ids.clone();
            reversed.reverse();
            let links: BTreeSet<Uuid> = normalize_category_ids(&reversed).into_iter().collect();
            prop_assert_eq!(&links, &expected);
        }

        /// Normalizing removes duplicates only and is idempotent
        #[test]
        fn prop_normalize_is_idempotent(ids in category_ids_strategy()) {
            let once = normalize_category_ids(&ids);
            let twice = normalize_category_ids(&once);
            prop_assert_eq!(&once, &twice);

            let distinct: BTreeSet<Uuid> = ids.iter().copied().collect();
            prop_assert_eq!(once.len(), distinct.len());
        }

        /// Deletion is refused exactly when some product links the category
        #[test]
        fn prop_delete_refused_iff_linked(linked in 0i64..=50) {
            prop_assert_eq!(check_category_deletable(linked).is_err(), linked > 0);
        }
    }
}
