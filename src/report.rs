//! Text rendering of calculation results

use std::fmt;

use crate::calculator::Classification;
use crate::error::UnknownItem;
use crate::models::{MaterialTotals, Request};

/// Whole units to report for a total; fractional amounts round up
pub fn whole_units(quantity: f64) -> u64 {
    let nearest = quantity.round();
    if (quantity - nearest).abs() < 1e-9 {
        nearest as u64
    } else {
        quantity.ceil() as u64
    }
}

/// Materials answer for one request
pub struct MaterialsReport<'a> {
    pub request: &'a Request,
    pub classification: &'a Classification,
    pub special_label: &'a str,
    pub intermediate: Option<&'a MaterialTotals>,
}

impl fmt::Display for MaterialsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (item, quantity) in self.request {
            writeln!(f, "**{}** x {}", item, quantity)?;
        }
        writeln!(f)?;

        writeln!(f, "Total materials required:")?;
        for (material, quantity) in &self.classification.ordinary {
            writeln!(f, "  **{}** x {}", material, whole_units(*quantity))?;
        }

        if !self.classification.special.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}:", self.special_label)?;
            for (material, quantity) in &self.classification.special {
                writeln!(f, "  {} x {}", material, whole_units(*quantity))?;
            }
        }

        if let Some(intermediate) = self.intermediate.filter(|t| !t.is_empty()) {
            writeln!(f)?;
            writeln!(f, "Intermediate materials crafted along the way:")?;
            for (material, quantity) in intermediate {
                writeln!(f, "  {} x {}", material, whole_units(*quantity))?;
            }
        }

        Ok(())
    }
}

/// "Did you mean" answer for unknown items
pub struct SuggestionReport<'a> {
    pub unknown: &'a [UnknownItem],
}

impl fmt::Display for SuggestionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The following items were not found:")?;
        writeln!(f)?;
        for item in self.unknown {
            if item.suggestions.is_empty() {
                writeln!(f, "**{}** : no similar items", item.name)?;
            } else {
                writeln!(f, "**{}** : did you mean {}", item.name, item.suggestions.join(", "))?;
            }
        }
        Ok(())
    }
}
