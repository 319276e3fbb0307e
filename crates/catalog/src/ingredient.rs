use serde::{Deserialize, Serialize};

use kitchenplan_core::{Entity, IngredientId, PlanningError, PlanningResult};
use kitchenplan_units::Unit;

/// Ingredient master data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDefinition {
    pub id: IngredientId,
    pub name: String,
    pub storage_unit: Unit,
    pub cost_per_storage_unit: f64,
    /// Weight of one piece in ounces, enabling piece <-> weight conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_weight_oz: Option<f64>,
}

impl IngredientDefinition {
    pub fn new(
        id: IngredientId,
        name: impl Into<String>,
        storage_unit: impl Into<Unit>,
        cost_per_storage_unit: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            storage_unit: storage_unit.into(),
            cost_per_storage_unit,
            piece_weight_oz: None,
        }
    }

    pub fn with_piece_weight_oz(mut self, ounces: f64) -> Self {
        self.piece_weight_oz = Some(ounces);
        self
    }

    /// Cost per storage unit, or `None` when it is negative or not a number.
    pub fn unit_cost(&self) -> Option<f64> {
        let cost = self.cost_per_storage_unit;
        (cost.is_finite() && cost >= 0.0).then_some(cost)
    }

    pub fn validate(&self) -> PlanningResult<()> {
        if self.name.trim().is_empty() {
            return Err(PlanningError::validation("ingredient name cannot be empty"));
        }
        if self.unit_cost().is_none() {
            return Err(PlanningError::validation(format!(
                "ingredient {}: cost per storage unit must be a non-negative number",
                self.name
            )));
        }
        Ok(())
    }
}

impl Entity for IngredientDefinition {
    type Id = IngredientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
