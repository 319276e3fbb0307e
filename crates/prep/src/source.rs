//! Read-only inputs supplied by the persistence layer.

use std::collections::HashMap;

use kitchenplan_catalog::{Catalog, ConversionOverride, IngredientDefinition, RecipeDefinition};
use kitchenplan_core::{LocationId, PlanningError, PlanningResult};
use kitchenplan_forecasting::HistoricalSalesRecord;

/// Storage-agnostic reader for everything a plan needs about one location.
pub trait PlanningDataSource: Send + Sync {
    fn sales_history(&self, location_id: LocationId) -> PlanningResult<Vec<HistoricalSalesRecord>>;

    fn recipes(&self, location_id: LocationId) -> PlanningResult<Vec<RecipeDefinition>>;

    fn ingredients(&self, location_id: LocationId) -> PlanningResult<Vec<IngredientDefinition>>;

    fn conversion_overrides(&self, location_id: LocationId) -> PlanningResult<Vec<ConversionOverride>>;

    /// Load history and catalog together.
    fn load(&self, location_id: LocationId) -> PlanningResult<PlanningInputs> {
        let history = self.sales_history(location_id)?;
        let catalog = Catalog::new(
            self.recipes(location_id)?,
            self.ingredients(location_id)?,
            self.conversion_overrides(location_id)?,
        );
        Ok(PlanningInputs { history, catalog })
    }
}

/// Materialized inputs for one location. Shared read-only across per-day plans.
#[derive(Debug, Clone, Default)]
pub struct PlanningInputs {
    pub history: Vec<HistoricalSalesRecord>,
    pub catalog: Catalog,
}

#[derive(Debug, Clone, Default)]
pub struct LocationData {
    pub history: Vec<HistoricalSalesRecord>,
    pub recipes: Vec<RecipeDefinition>,
    pub ingredients: Vec<IngredientDefinition>,
    pub overrides: Vec<ConversionOverride>,
}

/// In-memory data source (tests, demos, callers that already hold the data).
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanningData {
    locations: HashMap<LocationId, LocationData>,
}

impl InMemoryPlanningData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location_id: LocationId, data: LocationData) -> Self {
        self.locations.insert(location_id, data);
        self
    }

    fn location(&self, location_id: LocationId) -> PlanningResult<&LocationData> {
        self.locations
            .get(&location_id)
            .ok_or_else(|| PlanningError::not_found(format!("location {location_id}")))
    }
}

impl PlanningDataSource for InMemoryPlanningData {
    fn sales_history(&self, location_id: LocationId) -> PlanningResult<Vec<HistoricalSalesRecord>> {
        Ok(self.location(location_id)?.history.clone())
    }

    fn recipes(&self, location_id: LocationId) -> PlanningResult<Vec<RecipeDefinition>> {
        Ok(self.location(location_id)?.recipes.clone())
    }

    fn ingredients(&self, location_id: LocationId) -> PlanningResult<Vec<IngredientDefinition>> {
        Ok(self.location(location_id)?.ingredients.clone())
    }

    fn conversion_overrides(&self, location_id: LocationId) -> PlanningResult<Vec<ConversionOverride>> {
        Ok(self.location(location_id)?.overrides.clone())
    }
}
