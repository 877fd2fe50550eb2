//! Data models for recipes, requests and material totals

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// Maximum number of ingredient slots a recipe row can carry
pub const MAX_INGREDIENT_SLOTS: usize = 8;

/// A filled ingredient slot. Blank slots are dropped when the table is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub material: String,
    pub quantity: f64, // per batch, always > 0
}

impl Ingredient {
    pub fn new(material: impl Into<String>, quantity: f64) -> Self {
        Self {
            material: material.into(),
            quantity,
        }
    }
}

/// One way of crafting `output_item`. An item may have several rows (variants).
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRow {
    pub output_item: String,
    pub yield_per_batch: u32,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeRow {
    pub fn new(
        output_item: impl Into<String>,
        yield_per_batch: u32,
        ingredients: Vec<Ingredient>,
    ) -> Self {
        Self {
            output_item: output_item.into(),
            yield_per_batch,
            ingredients,
        }
    }
}

/// Requested items and quantities, in the order the user typed them
pub type Request = IndexMap<String, u64>;

/// Accumulated quantity per material name
pub type MaterialTotals = BTreeMap<String, f64>;

/// Add `quantity` to the entry for `material`, treating a missing entry as zero
pub fn add_quantity(totals: &mut MaterialTotals, material: &str, quantity: f64) {
    match totals.get_mut(material) {
        Some(existing) => *existing += quantity,
        None => {
            totals.insert(material.to_string(), quantity);
        }
    }
}

/// Key-wise sum of `from` into `into`
pub fn merge_totals(into: &mut MaterialTotals, from: &MaterialTotals) {
    for (material, quantity) in from {
        add_quantity(into, material, *quantity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn totals(entries: &[(&str, f64)]) -> MaterialTotals {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_add_quantity_missing_key_starts_at_zero() {
        let mut t = MaterialTotals::new();
        add_quantity(&mut t, "Ore", 4.0);
        add_quantity(&mut t, "Ore", 6.0);
        assert_eq!(t, totals(&[("Ore", 10.0)]));
    }

    #[test]
    fn test_merge_totals_sums_overlapping_keys() {
        let mut a = totals(&[("Ore", 3.0), ("Coal", 1.0)]);
        let b = totals(&[("Ore", 2.0), ("Wood", 5.0)]);
        merge_totals(&mut a, &b);
        assert_eq!(a, totals(&[("Coal", 1.0), ("Ore", 5.0), ("Wood", 5.0)]));
    }

    fn arb_totals() -> impl Strategy<Value = MaterialTotals> {
        prop::collection::btree_map("[a-e]", (0u32..1000).prop_map(f64::from), 0..5)
    }

    proptest! {
        #[test]
        fn prop_merge_is_commutative(a in arb_totals(), b in arb_totals()) {
            let mut ab = a.clone();
            merge_totals(&mut ab, &b);
            let mut ba = b.clone();
            merge_totals(&mut ba, &a);
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn prop_merge_is_associative(a in arb_totals(), b in arb_totals(), c in arb_totals()) {
            let mut left = a.clone();
            merge_totals(&mut left, &b);
            merge_totals(&mut left, &c);

            let mut bc = b.clone();
            merge_totals(&mut bc, &c);
            let mut right = a.clone();
            merge_totals(&mut right, &bc);

            prop_assert_eq!(left, right);
        }
    }
}
