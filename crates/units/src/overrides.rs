//! Ingredient-specific conversion overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use kitchenplan_core::IngredientId;

use crate::unit::Unit;

/// A directional conversion factor for one ingredient: `1 from_unit = factor to_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOverride {
    pub ingredient_id: IngredientId,
    pub from_unit: Unit,
    pub to_unit: Unit,
    pub factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ConversionOverride {
    pub fn new(ingredient_id: IngredientId, from_unit: Unit, to_unit: Unit, factor: f64) -> Self {
        Self {
            ingredient_id,
            from_unit,
            to_unit,
            factor,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// How an override was matched against a requested conversion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum OverrideMatch {
    /// Recorded in the requested direction; multiply by the factor.
    Exact(f64),
    /// Recorded in the opposite direction; multiply by the reciprocal.
    Reverse(f64),
}

/// Find the override edge `from -> to`, preferring the exact direction.
pub(crate) fn find_override(
    overrides: &[ConversionOverride],
    from: &Unit,
    to: &Unit,
) -> Option<OverrideMatch> {
    if let Some(o) = overrides
        .iter()
        .find(|o| &o.from_unit == from && &o.to_unit == to)
    {
        return Some(OverrideMatch::Exact(o.factor));
    }
    overrides
        .iter()
        .find(|o| &o.from_unit == to && &o.to_unit == from)
        .map(|o| OverrideMatch::Reverse(o.factor))
}

/// Overrides indexed by ingredient.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    by_ingredient: HashMap<IngredientId, Vec<ConversionOverride>>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, o: ConversionOverride) {
        self.by_ingredient.entry(o.ingredient_id).or_default().push(o);
    }

    /// Overrides recorded for `ingredient_id`, in insertion order.
    pub fn for_ingredient(&self, ingredient_id: IngredientId) -> &[ConversionOverride] {
        self.by_ingredient
            .get(&ingredient_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_ingredient.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ingredient.is_empty()
    }
}

impl FromIterator<ConversionOverride> for OverrideTable {
    fn from_iter<I: IntoIterator<Item = ConversionOverride>>(iter: I) -> Self {
        let mut table = OverrideTable::new();
        for o in iter {
            table.insert(o);
        }
        table
    }
}
