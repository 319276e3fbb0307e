//! Recipe food cost.
//!
//! Lines whose quantity cannot be expressed in the ingredient's storage unit
//! are priced as unknown, as are lines whose ingredient has an unusable cost;
//! the rest of the recipe is still costed.

use serde::{Deserialize, Serialize};

use kitchenplan_catalog::{Catalog, RecipeDefinition};
use kitchenplan_core::{IngredientId, RecipeId};
use kitchenplan_units::{Unit, convert};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCost {
    pub ingredient_id: IngredientId,
    pub ingredient_name: Option<String>,
    pub quantity: f64,
    pub unit: Unit,
    /// `None` when the line could not be priced.
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCost {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    /// Sum over priced lines only.
    pub total_cost: f64,
    pub cost_per_serving: Option<f64>,
    pub food_cost_percent: Option<f64>,
    pub lines: Vec<LineCost>,
}

impl RecipeCost {
    /// True when every line was priced.
    pub fn is_complete(&self) -> bool {
        self.lines.iter().all(|l| l.cost.is_some())
    }

    pub fn unknown_lines(&self) -> impl Iterator<Item = &LineCost> {
        self.lines.iter().filter(|l| l.cost.is_none())
    }
}

/// Price one batch of `recipe` against the catalog's ingredient costs.
pub fn cost_recipe(recipe: &RecipeDefinition, catalog: &Catalog) -> RecipeCost {
    let lines: Vec<LineCost> = recipe
        .ingredient_lines
        .iter()
        .map(|line| {
            let mut priced = LineCost {
                ingredient_id: line.ingredient_id,
                ingredient_name: None,
                quantity: line.quantity_per_batch,
                unit: line.unit.clone(),
                cost: None,
                reason: None,
            };
            let Some(ingredient) = catalog.ingredient(line.ingredient_id) else {
                priced.reason = Some("ingredient not found".to_string());
                return priced;
            };
            priced.ingredient_name = Some(ingredient.name.clone());
            let Some(unit_cost) = ingredient.unit_cost() else {
                priced.reason = Some("invalid ingredient cost".to_string());
                return priced;
            };

            match convert(
                line.quantity_per_batch,
                &line.unit,
                &ingredient.storage_unit,
                ingredient.piece_weight_oz,
                Some(catalog.overrides_for(ingredient.id)),
            ) {
                Ok(storage_quantity) => {
                    priced.cost = Some(round_cents(storage_quantity * unit_cost));
                }
                Err(failure) => {
                    tracing::debug!(recipe = %recipe.name, ingredient = %ingredient.name, %failure, "line cost unknown");
                    priced.reason = Some(failure.to_string());
                }
            }
            priced
        })
        .collect();

    let total_cost = round_cents(lines.iter().filter_map(|l| l.cost).sum());
    let cost_per_serving = recipe
        .servings
        .filter(|s| *s > 0)
        .map(|s| round_cents(total_cost / f64::from(s)));
    let food_cost_percent = match (cost_per_serving, recipe.selling_price) {
        (Some(per_serving), Some(price)) if price > 0.0 => {
            Some((per_serving / price * 1000.0).round() / 10.0)
        }
        _ => None,
    };

    RecipeCost {
        recipe_id: recipe.id,
        recipe_name: recipe.name.clone(),
        total_cost,
        cost_per_serving,
        food_cost_percent,
        lines,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
