//! How forecast revenue is split across recipes.

use std::collections::HashMap;

use kitchenplan_catalog::RecipeDefinition;
use kitchenplan_core::RecipeId;

/// Estimates each recipe's share of a day's revenue.
///
/// Returned shares are aligned index-for-index with `recipes`.
pub trait SalesMixStrategy: Send + Sync {
    fn shares(&self, recipes: &[RecipeDefinition]) -> Vec<f64>;
}

/// Every recipe on the menu gets `1 / recipe_count`.
///
/// Placeholder heuristic: the menu has no sales attribution, so revenue is
/// spread evenly, including over recipes that later turn out unplannable.
#[derive(Debug, Copy, Clone, Default)]
pub struct UniformSalesMix;

impl SalesMixStrategy for UniformSalesMix {
    fn shares(&self, recipes: &[RecipeDefinition]) -> Vec<f64> {
        if recipes.is_empty() {
            return Vec::new();
        }
        let share = 1.0 / recipes.len() as f64;
        vec![share; recipes.len()]
    }
}

/// Shares from externally measured weights (e.g. units sold last quarter).
///
/// Weights are normalized over the recipes being planned; recipes without a
/// weight get zero.
#[derive(Debug, Clone, Default)]
pub struct FixedSalesMix {
    weights: HashMap<RecipeId, f64>,
}

impl FixedSalesMix {
    pub fn new(weights: impl IntoIterator<Item = (RecipeId, f64)>) -> Self {
        Self {
            weights: weights
                .into_iter()
                .filter(|(_, w)| w.is_finite() && *w > 0.0)
                .collect(),
        }
    }
}

impl SalesMixStrategy for FixedSalesMix {
    fn shares(&self, recipes: &[RecipeDefinition]) -> Vec<f64> {
        let raw: Vec<f64> = recipes
            .iter()
            .map(|r| self.weights.get(&r.id).copied().unwrap_or(0.0))
            .collect();
        let total: f64 = raw.iter().sum();
        if total <= 0.0 {
            return vec![0.0; recipes.len()];
        }
        raw.into_iter().map(|w| w / total).collect()
    }
}
