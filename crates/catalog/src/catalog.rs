//! Lookup view over one location's recipes, ingredients and overrides.

use std::collections::HashMap;

use kitchenplan_core::{IngredientId, PlanningResult, RecipeId, index_by_id};
use kitchenplan_units::{ConversionOverride, OverrideTable};

use crate::ingredient::IngredientDefinition;
use crate::recipe::RecipeDefinition;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Menu order is preserved; planners iterate recipes in this order.
    recipes: Vec<RecipeDefinition>,
    ingredients: HashMap<IngredientId, IngredientDefinition>,
    overrides: OverrideTable,
}

impl Catalog {
    pub fn new(
        recipes: Vec<RecipeDefinition>,
        ingredients: impl IntoIterator<Item = IngredientDefinition>,
        overrides: impl IntoIterator<Item = ConversionOverride>,
    ) -> Self {
        Self {
            recipes,
            ingredients: index_by_id(ingredients),
            overrides: overrides.into_iter().collect(),
        }
    }

    /// Validate every recipe and ingredient, failing on the first bad record.
    pub fn validate(&self) -> PlanningResult<()> {
        for recipe in &self.recipes {
            recipe.validate()?;
        }
        for ingredient in self.ingredients.values() {
            ingredient.validate()?;
        }
        Ok(())
    }

    pub fn recipes(&self) -> &[RecipeDefinition] {
        &self.recipes
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&RecipeDefinition> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn ingredient(&self, id: IngredientId) -> Option<&IngredientDefinition> {
        self.ingredients.get(&id)
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn overrides_for(&self, id: IngredientId) -> &[ConversionOverride] {
        self.overrides.for_ingredient(id)
    }
}
