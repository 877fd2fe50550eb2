//! Read-only recipe catalog for one expansion session

use std::collections::{BTreeSet, HashMap};

use crate::models::RecipeRow;

/// Immutable index over recipe rows, keyed by output item
#[derive(Debug, Default)]
pub struct RecipeCatalog {
    row_count: usize,
    by_output: HashMap<String, Vec<RecipeRow>>,
    materials: BTreeSet<String>,
}

impl RecipeCatalog {
    /// Build a catalog from already validated rows. Variants keep table order.
    pub fn from_rows(rows: Vec<RecipeRow>) -> Self {
        let mut by_output: HashMap<String, Vec<RecipeRow>> = HashMap::new();
        let mut materials = BTreeSet::new();
        let row_count = rows.len();

        for row in rows {
            for ingredient in &row.ingredients {
                materials.insert(ingredient.material.clone());
            }
            by_output
                .entry(row.output_item.clone())
                .or_default()
                .push(row);
        }

        Self {
            row_count,
            by_output,
            materials,
        }
    }

    /// All rows producing `item`, empty if the item is not craftable
    pub fn lookup(&self, item: &str) -> &[RecipeRow] {
        self.by_output.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_craftable(&self, item: &str) -> bool {
        self.by_output.contains_key(item)
    }

    /// Craftable, or consumed as an ingredient somewhere in the table
    pub fn is_known_material(&self, name: &str) -> bool {
        self.is_craftable(name) || self.materials.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Number of recipe rows, variants included
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn craftable_count(&self) -> usize {
        self.by_output.len()
    }

    /// Sorted names of every craftable item
    pub fn craftable_items(&self) -> Vec<String> {
        let mut items: Vec<String> = self.by_output.keys().cloned().collect();
        items.sort();
        items
    }
}
