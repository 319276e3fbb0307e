use serde::{Deserialize, Serialize};

use kitchenplan_core::{Entity, IngredientId, PlanningError, PlanningResult, RecipeId};
use kitchenplan_units::Unit;

/// One ingredient line of a recipe, stated per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientLine {
    pub ingredient_id: IngredientId,
    pub quantity_per_batch: f64,
    pub unit: Unit,
}

impl RecipeIngredientLine {
    pub fn new(ingredient_id: IngredientId, quantity_per_batch: f64, unit: impl Into<Unit>) -> Self {
        Self {
            ingredient_id,
            quantity_per_batch,
            unit: unit.into(),
        }
    }
}

/// A menu item: batch yield, selling price and ingredient lines.
///
/// `servings` and `selling_price` are optional in the master data; recipes
/// missing either cannot be planned and are skipped by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDefinition {
    pub id: RecipeId,
    pub name: String,
    pub servings: Option<u32>,
    pub selling_price: Option<f64>,
    #[serde(default)]
    pub ingredient_lines: Vec<RecipeIngredientLine>,
}

impl RecipeDefinition {
    pub fn new(id: RecipeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            servings: None,
            selling_price: None,
            ingredient_lines: Vec::new(),
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }

    pub fn with_selling_price(mut self, price: f64) -> Self {
        self.selling_price = Some(price);
        self
    }

    pub fn with_line(mut self, line: RecipeIngredientLine) -> Self {
        self.ingredient_lines.push(line);
        self
    }

    /// Servings and price, when both are present and usable for planning.
    pub fn plannable(&self) -> Option<(u32, f64)> {
        match (self.servings, self.selling_price) {
            (Some(servings), Some(price)) if servings > 0 && price.is_finite() && price > 0.0 => {
                Some((servings, price))
            }
            _ => None,
        }
    }

    /// Structural checks on master data (not plannability).
    pub fn validate(&self) -> PlanningResult<()> {
        if self.name.trim().is_empty() {
            return Err(PlanningError::validation("recipe name cannot be empty"));
        }
        if let Some(price) = self.selling_price {
            if !price.is_finite() || price < 0.0 {
                return Err(PlanningError::validation(format!(
                    "recipe {}: selling price must be a non-negative number",
                    self.name
                )));
            }
        }
        for line in &self.ingredient_lines {
            if !line.quantity_per_batch.is_finite() || line.quantity_per_batch < 0.0 {
                return Err(PlanningError::validation(format!(
                    "recipe {}: ingredient quantity must be a non-negative number",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl Entity for RecipeDefinition {
    type Id = RecipeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plannable_requires_servings_and_positive_price() {
        let base = RecipeDefinition::new(RecipeId::new(), "Margherita");
        assert_eq!(base.plannable(), None);
        assert_eq!(base.clone().with_servings(8).plannable(), None);
        assert_eq!(base.clone().with_servings(0).with_selling_price(14.0).plannable(), None);
        assert_eq!(
            base.with_servings(8).with_selling_price(14.0).plannable(),
            Some((8, 14.0))
        );
    }

    #[test]
    fn validate_rejects_blank_name_and_negative_quantities() {
        let err = RecipeDefinition::new(RecipeId::new(), "  ").validate().unwrap_err();
        assert!(matches!(err, PlanningError::Validation(msg) if msg.contains("name")));

        let recipe = RecipeDefinition::new(RecipeId::new(), "Soup")
            .with_line(RecipeIngredientLine::new(IngredientId::new(), -1.0, "qt"));
        assert!(recipe.validate().is_err());
    }

    #[test]
    fn deserializes_camel_case_with_unit_names() {
        let json = r#"{
            "id": "018f3a4e-0000-7000-8000-000000000001",
            "name": "Caesar Salad",
            "servings": 4,
            "sellingPrice": 11.5,
            "ingredientLines": [
                {"ingredientId": "018f3a4e-0000-7000-8000-000000000002", "quantityPerBatch": 2, "unit": "heads"},
                {"ingredientId": "018f3a4e-0000-7000-8000-000000000003", "quantityPerBatch": 0.5, "unit": "Cups"}
            ]
        }"#;
        let recipe: RecipeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.ingredient_lines[0].unit, Unit::Custom("heads".to_string()));
        assert_eq!(recipe.ingredient_lines[1].unit, Unit::Cup);
    }
}
