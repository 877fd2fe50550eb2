//! Recipe expansion: resolve requested items into raw material totals

use std::collections::BTreeSet;

use crate::catalog::RecipeCatalog;
use crate::error::{CalcError, UnknownItem};
use crate::models::{MaterialTotals, Request, add_quantity, merge_totals};
use crate::suggest;

/// Tolerance for treating `quantity / yield` as a whole number of batches
const BATCH_EPSILON: f64 = 1e-9;

/// Result of expanding a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// Non-craftable materials
    pub leaf_totals: MaterialTotals,
    /// Craftable materials consumed on the way, summed over every level
    pub intermediate_totals: MaterialTotals,
}

/// Leaf totals split by the configured special-item set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub ordinary: MaterialTotals,
    pub special: MaterialTotals,
}

/// Expand `request` into the total raw materials required
///
/// Each level multiplies whole batches (`ceil(quantity / yield)`) by the
/// per-batch ingredient amounts; the craftable ingredients gathered at that
/// level become the next level. Items without a recipe are their own
/// requirement.
pub fn expand(catalog: &RecipeCatalog, request: &Request) -> Result<Expansion, CalcError> {
    if catalog.is_empty() {
        return Err(CalcError::EmptyCatalog);
    }

    let mut level = MaterialTotals::new();
    for (item, &quantity) in request {
        if quantity > 0 {
            add_quantity(&mut level, item, quantity as f64);
        }
    }

    let mut expansion = Expansion::default();
    let mut depth = 0;

    while !level.is_empty() {
        // An acyclic chain of craftable items is at most craftable_count() long
        if depth >= catalog.craftable_count() {
            return Err(CalcError::CyclicRecipe {
                items: level.into_keys().collect(),
            });
        }

        let next_level = expand_level(catalog, &level, &mut expansion.leaf_totals);
        if !next_level.is_empty() {
            tracing::trace!(
                depth,
                materials = next_level.len(),
                "expanding intermediate materials"
            );
            merge_totals(&mut expansion.intermediate_totals, &next_level);
        }

        level = next_level;
        depth += 1;
    }

    Ok(expansion)
}

/// Expand one level: leaves go into `leaf_totals`, craftable ingredients
/// are returned as the next level
fn expand_level(
    catalog: &RecipeCatalog,
    level: &MaterialTotals,
    leaf_totals: &mut MaterialTotals,
) -> MaterialTotals {
    let mut next_level = MaterialTotals::new();

    for (item, &quantity) in level {
        if quantity <= 0.0 {
            continue;
        }

        let rows = catalog.lookup(item);
        if rows.is_empty() {
            add_quantity(leaf_totals, item, quantity);
            continue;
        }

        for row in rows {
            let batches = batches_needed(quantity, row.yield_per_batch);
            for ingredient in &row.ingredients {
                let needed = batches * ingredient.quantity;
                if catalog.is_craftable(&ingredient.material) {
                    add_quantity(&mut next_level, &ingredient.material, needed);
                } else {
                    add_quantity(leaf_totals, &ingredient.material, needed);
                }
            }
        }
    }

    next_level
}

/// Whole crafting actions needed to produce `quantity`; partial batches round up
pub fn batches_needed(quantity: f64, yield_per_batch: u32) -> f64 {
    let exact = quantity / f64::from(yield_per_batch);
    let nearest = exact.round();
    if (exact - nearest).abs() < BATCH_EPSILON {
        nearest
    } else {
        exact.ceil()
    }
}

/// Partition leaf totals into ordinary and special materials
pub fn classify(leaf_totals: &MaterialTotals, special_names: &BTreeSet<String>) -> Classification {
    let mut classification = Classification::default();
    for (material, &quantity) in leaf_totals {
        let target = if special_names.contains(material) {
            &mut classification.special
        } else {
            &mut classification.ordinary
        };
        target.insert(material.clone(), quantity);
    }
    classification
}

/// Reject requested items the catalog knows nothing about, with suggestions
pub fn validate_request(
    catalog: &RecipeCatalog,
    request: &Request,
    limit: usize,
    cutoff: f64,
) -> Result<(), CalcError> {
    let unknown: Vec<&String> = request
        .keys()
        .filter(|item| !catalog.is_known_material(item))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    let candidates = catalog.craftable_items();
    let items = unknown
        .into_iter()
        .map(|name| UnknownItem {
            name: name.clone(),
            suggestions: suggest::suggest(name, &candidates, limit, cutoff),
        })
        .collect();

    Err(CalcError::UnknownRootItems(items))
}
