//! Single-day prep planning.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kitchenplan_catalog::{Catalog, RecipeDefinition, RecipeIngredientLine};
use kitchenplan_core::{
    Clock, IngredientId, LocationId, PlanningError, PlanningResult, RecipeId, SystemClock,
};
use kitchenplan_forecasting::{ForecastPoint, RevenueForecaster};
use kitchenplan_units::{Unit, convert};

use crate::config::PlannerConfig;
use crate::mix::{SalesMixStrategy, UniformSalesMix};
use crate::source::{PlanningDataSource, PlanningInputs};

/// One recipe's contribution to an ingredient recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeContribution {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub estimated_servings: u32,
    /// In the ingredient's storage unit.
    pub ingredient_quantity: f64,
}

/// How much of one ingredient to prep.
///
/// `total_with_buffer ≈ recommended_quantity + safety_buffer` (each rounded up
/// to one decimal) and the contributions sum to `recommended_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepRecommendation {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub recommended_quantity: f64,
    pub unit: Unit,
    pub safety_buffer: f64,
    pub total_with_buffer: f64,
    /// `None` when the ingredient's unit cost is unusable.
    pub estimated_cost: Option<f64>,
    pub recipes: Vec<RecipeContribution>,
}

/// A recoverable problem encountered while planning; the plan still completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanWarning {
    /// Recipe lacks servings or selling price.
    #[serde(rename_all = "camelCase")]
    RecipeSkipped {
        recipe_id: RecipeId,
        recipe_name: String,
    },
    /// A recipe line references an ingredient missing from master data.
    #[serde(rename_all = "camelCase")]
    UnknownIngredient {
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    },
    /// A recipe line's quantity is negative or not a number.
    #[serde(rename_all = "camelCase")]
    InvalidLineQuantity {
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    },
    /// The ingredient's cost per storage unit is negative or not a number;
    /// its quantity is planned but left out of the cost totals.
    #[serde(rename_all = "camelCase")]
    InvalidIngredientCost {
        ingredient_id: IngredientId,
        ingredient_name: String,
    },
    /// Estimated servings exceed the representable range; the recipe is skipped.
    #[serde(rename_all = "camelCase")]
    ServingsOverflow {
        recipe_id: RecipeId,
        recipe_name: String,
    },
    /// The recipe unit cannot be converted to the ingredient's storage unit.
    #[serde(rename_all = "camelCase")]
    UnconvertibleLine {
        recipe_id: RecipeId,
        recipe_name: String,
        ingredient_id: IngredientId,
        ingredient_name: String,
        from_unit: Unit,
        to_unit: Unit,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepPlanResult {
    pub location_id: LocationId,
    pub target_date: NaiveDate,
    pub forecast_revenue: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    /// 0–100, from the relative width of the confidence band.
    pub confidence_level: u8,
    pub safety_buffer_percent: f64,
    /// Sorted by `total_with_buffer`, largest first.
    pub recommendations: Vec<PrepRecommendation>,
    /// Recipes that contributed to the plan.
    pub total_recipes: usize,
    pub total_ingredients: usize,
    /// Percent relative to the assumed over-prep baseline; negative when the
    /// buffer exceeds that baseline.
    pub estimated_waste_reduction: i64,
    pub estimated_total_cost: f64,
    pub warnings: Vec<PlanWarning>,
}

/// Round up to one decimal place. Zero and below collapse to `0.0`.
pub(crate) fn ceil_tenth(value: f64) -> f64 {
    // Tolerate representation noise such as 2.3 * 10 = 22.999999999999996.
    let scaled = (value * 10.0 - 1e-9).ceil();
    if scaled <= 0.0 { 0.0 } else { scaled / 10.0 }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// `100 * (1 - band_width / predicted)`, clamped to 0–100.
pub(crate) fn confidence_level(point: &ForecastPoint) -> u8 {
    if point.predicted_revenue <= 0.0 {
        return 0;
    }
    let level = 100.0 * (1.0 - point.interval_width() / point.predicted_revenue);
    level.clamp(0.0, 100.0).round() as u8
}

/// Servings needed to cover `revenue` at `price`, rounded up. `None` when the
/// count does not fit a `u32`.
pub(crate) fn estimated_servings(revenue: f64, price: f64) -> Option<u32> {
    let servings = (revenue / price).ceil().max(0.0);
    (servings.is_finite() && servings <= f64::from(u32::MAX)).then_some(servings as u32)
}

pub(crate) fn waste_reduction(safety_buffer_percent: f64, baseline_percent: f64) -> i64 {
    ((baseline_percent - safety_buffer_percent) / baseline_percent * 100.0).round() as i64
}

/// Running total for one ingredient while recipes are walked.
#[derive(Debug, Default)]
struct IngredientTally {
    total: f64,
    recipes: Vec<RecipeContribution>,
}

/// Plans prep quantities for a location from its forecast and menu.
pub struct PrepPlanner<S> {
    source: S,
    config: PlannerConfig,
    forecaster: RevenueForecaster,
    clock: Box<dyn Clock>,
    mix: Box<dyn SalesMixStrategy>,
}

impl<S: PlanningDataSource> PrepPlanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, PlannerConfig::default())
    }

    pub fn with_config(source: S, config: PlannerConfig) -> Self {
        Self {
            source,
            forecaster: RevenueForecaster::new(config.forecast.clone()),
            config,
            clock: Box::new(SystemClock),
            mix: Box::new(UniformSalesMix),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_sales_mix(mut self, mix: impl SalesMixStrategy + 'static) -> Self {
        self.mix = Box::new(mix);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Plan prep quantities for `target_date`.
    ///
    /// Errors:
    /// - `InvalidDateRange` if the target is not strictly after today or is
    ///   beyond the planning horizon;
    /// - `Validation` if the buffer percent is outside the allowed range;
    /// - `InsufficientHistoricalData` from the forecast.
    #[tracing::instrument(skip(self))]
    pub fn plan_prep(
        &self,
        location_id: LocationId,
        target_date: NaiveDate,
        safety_buffer_percent: f64,
    ) -> PlanningResult<PrepPlanResult> {
        self.validate_buffer(safety_buffer_percent)?;
        let today = self.today();
        self.validate_target(today, target_date)?;

        let inputs = self.source.load(location_id)?;
        let plan = self.plan_for_day(&inputs, location_id, today, target_date, safety_buffer_percent)?;

        tracing::info!(
            %location_id,
            %target_date,
            forecast_revenue = plan.forecast_revenue,
            ingredients = plan.total_ingredients,
            warnings = plan.warnings.len(),
            "prep plan produced"
        );
        Ok(plan)
    }

    pub(crate) fn validate_buffer(&self, safety_buffer_percent: f64) -> PlanningResult<()> {
        let max = self.config.max_safety_buffer_percent;
        if !(safety_buffer_percent.is_finite() && (0.0..=max).contains(&safety_buffer_percent)) {
            return Err(PlanningError::validation(format!(
                "safety buffer percent must be between 0 and {max} (got {safety_buffer_percent})"
            )));
        }
        Ok(())
    }

    /// Days between today and a valid target date.
    pub(crate) fn validate_target(&self, today: NaiveDate, target_date: NaiveDate) -> PlanningResult<u32> {
        let days_ahead = (target_date - today).num_days();
        if days_ahead <= 0 {
            return Err(PlanningError::invalid_date_range(format!(
                "target date {target_date} must be after {today}"
            )));
        }
        let max = i64::from(self.config.max_horizon_days);
        if days_ahead > max {
            return Err(PlanningError::invalid_date_range(format!(
                "target date {target_date} is {days_ahead} days ahead; the limit is {max}"
            )));
        }
        // Bounded by max_horizon_days above.
        Ok(days_ahead as u32)
    }

    /// Plan one day from already-loaded inputs. Pure given `today`.
    pub(crate) fn plan_for_day(
        &self,
        inputs: &PlanningInputs,
        location_id: LocationId,
        today: NaiveDate,
        target_date: NaiveDate,
        safety_buffer_percent: f64,
    ) -> PlanningResult<PrepPlanResult> {
        let days_ahead = self.validate_target(today, target_date)?;
        let forecast = self.forecaster.forecast(&inputs.history, today, days_ahead)?;
        let point = forecast
            .forecasts
            .last()
            .ok_or_else(|| PlanningError::validation("forecast produced no points"))?;

        Ok(self.plan_from_forecast(
            location_id,
            point,
            &inputs.catalog,
            safety_buffer_percent,
        ))
    }

    fn plan_from_forecast(
        &self,
        location_id: LocationId,
        point: &ForecastPoint,
        catalog: &Catalog,
        safety_buffer_percent: f64,
    ) -> PrepPlanResult {
        let revenue = point.predicted_revenue;
        let recipes = catalog.recipes();
        let shares = self.mix.shares(recipes);

        let mut order: Vec<IngredientId> = Vec::new();
        let mut tallies: HashMap<IngredientId, IngredientTally> = HashMap::new();
        let mut warnings: Vec<PlanWarning> = Vec::new();
        let mut total_recipes = 0;

        for (recipe, share) in recipes.iter().zip(shares) {
            let Some((servings, price)) = recipe.plannable() else {
                warnings.push(PlanWarning::RecipeSkipped {
                    recipe_id: recipe.id,
                    recipe_name: recipe.name.clone(),
                });
                continue;
            };
            let Some(estimated_servings) = estimated_servings(revenue * share, price) else {
                tracing::warn!(recipe = %recipe.name, price, "estimated servings out of range; skipping recipe");
                warnings.push(PlanWarning::ServingsOverflow {
                    recipe_id: recipe.id,
                    recipe_name: recipe.name.clone(),
                });
                continue;
            };
            total_recipes += 1;

            for line in &recipe.ingredient_lines {
                let Some(quantity_per_batch) = storage_quantity(recipe, line, catalog, &mut warnings)
                else {
                    continue;
                };
                let per_serving = quantity_per_batch / f64::from(servings);
                let quantity = per_serving * f64::from(estimated_servings);

                let tally = tallies.entry(line.ingredient_id).or_insert_with(|| {
                    order.push(line.ingredient_id);
                    IngredientTally::default()
                });
                tally.total += quantity;
                match tally.recipes.iter_mut().find(|c| c.recipe_id == recipe.id) {
                    Some(existing) => existing.ingredient_quantity += quantity,
                    None => tally.recipes.push(RecipeContribution {
                        recipe_id: recipe.id,
                        recipe_name: recipe.name.clone(),
                        estimated_servings,
                        ingredient_quantity: quantity,
                    }),
                }
            }
        }

        let mut recommendations: Vec<PrepRecommendation> = order
            .into_iter()
            .filter_map(|id| {
                let tally = tallies.remove(&id)?;
                let ingredient = catalog.ingredient(id)?;
                let buffer_raw = tally.total * safety_buffer_percent / 100.0;
                let total_with_buffer = ceil_tenth(tally.total + buffer_raw);
                let unit_cost = ingredient.unit_cost();
                if unit_cost.is_none() {
                    tracing::warn!(ingredient = %ingredient.name, "ingredient cost unusable; leaving it out of totals");
                    warnings.push(PlanWarning::InvalidIngredientCost {
                        ingredient_id: id,
                        ingredient_name: ingredient.name.clone(),
                    });
                }
                Some(PrepRecommendation {
                    ingredient_id: id,
                    ingredient_name: ingredient.name.clone(),
                    recommended_quantity: ceil_tenth(tally.total),
                    unit: ingredient.storage_unit.clone(),
                    safety_buffer: ceil_tenth(buffer_raw),
                    total_with_buffer,
                    estimated_cost: unit_cost.map(|c| round_to(total_with_buffer * c, 2)),
                    recipes: tally
                        .recipes
                        .into_iter()
                        .map(|mut c| {
                            c.ingredient_quantity = round_to(c.ingredient_quantity, 2);
                            c
                        })
                        .collect(),
                })
            })
            .collect();

        // Stable: equal totals keep first-seen order.
        recommendations.sort_by(|a, b| b.total_with_buffer.total_cmp(&a.total_with_buffer));

        let estimated_total_cost =
            round_to(recommendations.iter().filter_map(|r| r.estimated_cost).sum(), 2);

        PrepPlanResult {
            location_id,
            target_date: point.date,
            forecast_revenue: revenue,
            confidence_lower: point.confidence_lower,
            confidence_upper: point.confidence_upper,
            confidence_level: confidence_level(point),
            safety_buffer_percent,
            total_recipes,
            total_ingredients: recommendations.len(),
            recommendations,
            estimated_waste_reduction: waste_reduction(
                safety_buffer_percent,
                self.config.waste_baseline_percent,
            ),
            estimated_total_cost,
            warnings,
        }
    }
}

/// A line's batch quantity in its ingredient's storage unit, or `None` with a warning.
fn storage_quantity(
    recipe: &RecipeDefinition,
    line: &RecipeIngredientLine,
    catalog: &Catalog,
    warnings: &mut Vec<PlanWarning>,
) -> Option<f64> {
    let Some(ingredient) = catalog.ingredient(line.ingredient_id) else {
        warnings.push(PlanWarning::UnknownIngredient {
            recipe_id: recipe.id,
            ingredient_id: line.ingredient_id,
        });
        return None;
    };
    if !(line.quantity_per_batch.is_finite() && line.quantity_per_batch >= 0.0) {
        warnings.push(PlanWarning::InvalidLineQuantity {
            recipe_id: recipe.id,
            ingredient_id: line.ingredient_id,
        });
        return None;
    }

    match convert(
        line.quantity_per_batch,
        &line.unit,
        &ingredient.storage_unit,
        ingredient.piece_weight_oz,
        Some(catalog.overrides_for(ingredient.id)),
    ) {
        Ok(quantity) => Some(quantity),
        Err(failure) => {
            tracing::warn!(
                recipe = %recipe.name,
                ingredient = %ingredient.name,
                %failure,
                "skipping recipe line with unconvertible unit"
            );
            warnings.push(PlanWarning::UnconvertibleLine {
                recipe_id: recipe.id,
                recipe_name: recipe.name.clone(),
                ingredient_id: ingredient.id,
                ingredient_name: ingredient.name.clone(),
                from_unit: line.unit.clone(),
                to_unit: ingredient.storage_unit.clone(),
                reason: failure.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use kitchenplan_catalog::{ConversionOverride, IngredientDefinition};
    use kitchenplan_core::FixedClock;
    use kitchenplan_forecasting::HistoricalSalesRecord;
    use proptest::prelude::*;

    use crate::mix::FixedSalesMix;
    use crate::source::{InMemoryPlanningData, LocationData};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn flat_history(daily: f64) -> Vec<HistoricalSalesRecord> {
        (1..=28)
            .map(|back| HistoricalSalesRecord::new(today() - Days::new(back), daily))
            .collect()
    }

    struct Kitchen {
        location: LocationId,
        flour: IngredientDefinition,
        cheese: IngredientDefinition,
        eggs: IngredientDefinition,
        pizza: RecipeDefinition,
        pasta: RecipeDefinition,
    }

    /// Two recipes, $1000/day flat revenue: each recipe gets $500.
    fn kitchen() -> (Kitchen, InMemoryPlanningData) {
        let location = LocationId::new();
        let flour = IngredientDefinition::new(IngredientId::new(), "Flour", "lb", 0.6);
        let cheese = IngredientDefinition::new(IngredientId::new(), "Mozzarella", "lb", 4.0);
        let eggs = IngredientDefinition::new(IngredientId::new(), "Eggs", "each", 0.3);

        // 8 servings per batch at $10 -> 50 servings -> 50/8 batches.
        let pizza = RecipeDefinition::new(RecipeId::new(), "Pizza")
            .with_servings(8)
            .with_selling_price(10.0)
            .with_line(RecipeIngredientLine::new(flour.id, 32.0, "oz"))
            .with_line(RecipeIngredientLine::new(cheese.id, 1.0, "lb"));
        // 4 servings per batch at $20 -> 25 servings.
        let pasta = RecipeDefinition::new(RecipeId::new(), "Pasta")
            .with_servings(4)
            .with_selling_price(20.0)
            .with_line(RecipeIngredientLine::new(flour.id, 1.0, "lb"))
            .with_line(RecipeIngredientLine::new(eggs.id, 4.0, "each"));

        let source = InMemoryPlanningData::new().with_location(
            location,
            LocationData {
                history: flat_history(1000.0),
                recipes: vec![pizza.clone(), pasta.clone()],
                ingredients: vec![flour.clone(), cheese.clone(), eggs.clone()],
                overrides: Vec::new(),
            },
        );
        (
            Kitchen {
                location,
                flour,
                cheese,
                eggs,
                pizza,
                pasta,
            },
            source,
        )
    }

    fn planner(source: InMemoryPlanningData) -> PrepPlanner<InMemoryPlanningData> {
        PrepPlanner::new(source).with_clock(FixedClock(today()))
    }

    fn find<'a>(plan: &'a PrepPlanResult, id: IngredientId) -> &'a PrepRecommendation {
        plan.recommendations
            .iter()
            .find(|r| r.ingredient_id == id)
            .unwrap()
    }

    #[test]
    fn quantities_follow_servings_and_units() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(3), 0.0)
            .unwrap();

        assert_eq!(plan.forecast_revenue, 1000.0);
        assert_eq!(plan.total_recipes, 2);
        assert_eq!(plan.total_ingredients, 3);

        // Pizza: 2 lb flour per 8 servings * 50 = 12.5 lb; pasta: 1 lb per 4 * 25 = 6.25 lb.
        let flour = find(&plan, k.flour.id);
        assert_eq!(flour.unit, Unit::Pound);
        assert_eq!(flour.recommended_quantity, 18.8);
        assert_eq!(flour.recipes.len(), 2);
        assert_eq!(flour.recipes[0].recipe_id, k.pizza.id);
        assert_eq!(flour.recipes[0].estimated_servings, 50);
        assert_eq!(flour.recipes[0].ingredient_quantity, 12.5);
        assert_eq!(flour.recipes[1].recipe_id, k.pasta.id);
        assert_eq!(flour.recipes[1].ingredient_quantity, 6.25);

        // 1 lb per 8 servings * 50 = 6.25 lb.
        assert_eq!(find(&plan, k.cheese.id).recommended_quantity, 6.3);
        // 4 per 4 servings * 25 = 25 eggs.
        assert_eq!(find(&plan, k.eggs.id).recommended_quantity, 25.0);
    }

    #[test]
    fn zero_buffer_means_no_buffer_and_full_waste_reduction() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        assert_eq!(plan.estimated_waste_reduction, 100);
        for r in &plan.recommendations {
            assert_eq!(r.safety_buffer, 0.0);
            assert_eq!(r.total_with_buffer, r.recommended_quantity);
        }
    }

    #[test]
    fn fifty_percent_buffer_gives_negative_waste_reduction() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 50.0)
            .unwrap();

        assert!(plan.estimated_waste_reduction < 0);
        assert_eq!(plan.estimated_waste_reduction, -67);
        let eggs = find(&plan, k.eggs.id);
        assert_eq!(eggs.safety_buffer, 12.5);
        assert_eq!(eggs.total_with_buffer, 37.5);
    }

    #[test]
    fn recommendations_sorted_largest_first() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(2), 10.0)
            .unwrap();

        let totals: Vec<f64> = plan.recommendations.iter().map(|r| r.total_with_buffer).collect();
        assert!(totals.windows(2).all(|w| w[0] >= w[1]), "{totals:?}");
        assert_eq!(plan.recommendations[0].ingredient_id, k.eggs.id);
    }

    #[test]
    fn estimated_cost_prices_buffered_quantity() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        assert_eq!(find(&plan, k.eggs.id).estimated_cost, Some(7.5));
        let sum: f64 = plan.recommendations.iter().filter_map(|r| r.estimated_cost).sum();
        assert!((plan.estimated_total_cost - sum).abs() < 0.01);
    }

    #[test]
    fn target_date_must_be_future_and_within_horizon() {
        let (k, source) = kitchen();
        let planner = planner(source);

        for bad in [today() - Days::new(1), today(), today() + Days::new(35)] {
            let err = planner.plan_prep(k.location, bad, 10.0).unwrap_err();
            assert!(matches!(err, PlanningError::InvalidDateRange(_)), "{bad}: {err:?}");
        }
        assert!(planner.plan_prep(k.location, today() + Days::new(30), 10.0).is_ok());
    }

    #[test]
    fn buffer_outside_range_is_rejected() {
        let (k, source) = kitchen();
        let planner = planner(source);
        for bad in [-1.0, 50.5, f64::NAN] {
            let err = planner
                .plan_prep(k.location, today() + Days::new(1), bad)
                .unwrap_err();
            assert!(matches!(err, PlanningError::Validation(_)));
        }
    }

    #[test]
    fn insufficient_history_propagates() {
        let (k, _) = kitchen();
        let source = InMemoryPlanningData::new().with_location(
            k.location,
            LocationData {
                history: flat_history(1000.0).into_iter().take(5).collect(),
                recipes: vec![k.pizza.clone()],
                ingredients: vec![k.flour.clone(), k.cheese.clone()],
                overrides: Vec::new(),
            },
        );
        let err = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 10.0)
            .unwrap_err();
        assert!(matches!(err, PlanningError::InsufficientHistoricalData { found: 5, .. }));
    }

    #[test]
    fn bad_lines_are_flagged_not_fatal() {
        let (k, _) = kitchen();
        let tomatoes = IngredientDefinition::new(IngredientId::new(), "Tomatoes", "lb", 1.5);
        let basil = IngredientDefinition::new(IngredientId::new(), "Basil", "oz", 2.0);
        let missing = IngredientId::new();

        let salad = RecipeDefinition::new(RecipeId::new(), "Caprese")
            .with_servings(2)
            .with_selling_price(12.0)
            // No piece weight on tomatoes: cannot reach lb.
            .with_line(RecipeIngredientLine::new(tomatoes.id, 2.0, "each"))
            .with_line(RecipeIngredientLine::new(missing, 1.0, "oz"))
            .with_line(RecipeIngredientLine::new(basil.id, 1.0, "bunch"))
            .with_line(RecipeIngredientLine::new(k.cheese.id, 8.0, "oz"));
        let unpriced = RecipeDefinition::new(RecipeId::new(), "Staff Meal").with_servings(10);

        let source = InMemoryPlanningData::new().with_location(
            k.location,
            LocationData {
                history: flat_history(1200.0),
                recipes: vec![salad.clone(), unpriced.clone()],
                ingredients: vec![tomatoes.clone(), basil.clone(), k.cheese.clone()],
                overrides: vec![ConversionOverride::new(
                    basil.id,
                    Unit::parse("bunch"),
                    Unit::Ounce,
                    3.0,
                )],
            },
        );

        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        assert_eq!(plan.total_recipes, 1);
        // Uniform share is 1/2 of $1200 -> $600 / $12 = 50 servings.
        let basil_rec = find(&plan, basil.id);
        assert_eq!(basil_rec.recommended_quantity, 75.0);
        assert_eq!(find(&plan, k.cheese.id).recommended_quantity, 12.5);
        assert!(plan.recommendations.iter().all(|r| r.ingredient_id != tomatoes.id));

        assert!(plan.warnings.contains(&PlanWarning::RecipeSkipped {
            recipe_id: unpriced.id,
            recipe_name: "Staff Meal".to_string(),
        }));
        assert!(plan.warnings.contains(&PlanWarning::UnknownIngredient {
            recipe_id: salad.id,
            ingredient_id: missing,
        }));
        assert!(plan.warnings.iter().any(|w| matches!(
            w,
            PlanWarning::UnconvertibleLine { ingredient_id, .. } if *ingredient_id == tomatoes.id
        )));
    }

    #[test]
    fn piece_weight_bridges_count_lines_to_weight_storage() {
        let (k, _) = kitchen();
        let lemons = IngredientDefinition::new(IngredientId::new(), "Lemons", "lb", 2.0)
            .with_piece_weight_oz(4.0);
        let lemonade = RecipeDefinition::new(RecipeId::new(), "Lemonade")
            .with_servings(4)
            .with_selling_price(5.0)
            .with_line(RecipeIngredientLine::new(lemons.id, 8.0, "pc"));

        let source = InMemoryPlanningData::new().with_location(
            k.location,
            LocationData {
                history: flat_history(100.0),
                recipes: vec![lemonade],
                ingredients: vec![lemons.clone()],
                overrides: Vec::new(),
            },
        );
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        // 20 servings; 8 lemons (2 lb) per 4 servings -> 10 lb.
        assert_eq!(find(&plan, lemons.id).recommended_quantity, 10.0);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn injected_sales_mix_redistributes_demand() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .with_sales_mix(FixedSalesMix::new([(k.pizza.id, 1.0)]))
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        // All $1000 to pizza: 100 servings, nothing for pasta.
        let flour = find(&plan, k.flour.id);
        assert_eq!(flour.recipes[0].estimated_servings, 100);
        assert_eq!(flour.recipes[1].estimated_servings, 0);
        assert_eq!(flour.recommended_quantity, 25.0);
        assert_eq!(find(&plan, k.eggs.id).recommended_quantity, 0.0);
    }

    #[test]
    fn unusable_ingredient_cost_is_flagged_and_left_out_of_totals() {
        let (k, _) = kitchen();
        let saffron = IngredientDefinition::new(IngredientId::new(), "Saffron", "oz", f64::NAN);
        let paella = RecipeDefinition::new(RecipeId::new(), "Paella")
            .with_servings(4)
            .with_selling_price(25.0)
            .with_line(RecipeIngredientLine::new(saffron.id, 0.1, "oz"))
            .with_line(RecipeIngredientLine::new(k.cheese.id, 1.0, "lb"));

        let source = InMemoryPlanningData::new().with_location(
            k.location,
            LocationData {
                history: flat_history(1000.0),
                recipes: vec![paella],
                ingredients: vec![saffron.clone(), k.cheese.clone()],
                overrides: Vec::new(),
            },
        );
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        // 40 servings: 1 saffron oz, 10 lb cheese at $4.
        assert_eq!(find(&plan, saffron.id).recommended_quantity, 1.0);
        assert_eq!(find(&plan, saffron.id).estimated_cost, None);
        assert_eq!(find(&plan, k.cheese.id).estimated_cost, Some(40.0));
        assert_eq!(plan.estimated_total_cost, 40.0);
        assert!(plan.warnings.contains(&PlanWarning::InvalidIngredientCost {
            ingredient_id: saffron.id,
            ingredient_name: "Saffron".to_string(),
        }));

        let (k2, _) = kitchen();
        let negative = IngredientDefinition::new(IngredientId::new(), "Rebate Oil", "qt", -2.0);
        let fries = RecipeDefinition::new(RecipeId::new(), "Fries")
            .with_servings(10)
            .with_selling_price(5.0)
            .with_line(RecipeIngredientLine::new(negative.id, 1.0, "qt"));
        let source = InMemoryPlanningData::new().with_location(
            k2.location,
            LocationData {
                history: flat_history(1000.0),
                recipes: vec![fries],
                ingredients: vec![negative],
                overrides: Vec::new(),
            },
        );
        let plan = planner(source)
            .plan_prep(k2.location, today() + Days::new(1), 0.0)
            .unwrap();
        assert_eq!(plan.estimated_total_cost, 0.0);
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn servings_beyond_u32_skip_the_recipe() {
        let (k, _) = kitchen();
        let crumbs = RecipeDefinition::new(RecipeId::new(), "Bread Crumb")
            .with_servings(1)
            .with_selling_price(1e-9)
            .with_line(RecipeIngredientLine::new(k.flour.id, 1.0, "oz"));
        let source = InMemoryPlanningData::new().with_location(
            k.location,
            LocationData {
                history: flat_history(10_000.0),
                recipes: vec![crumbs.clone(), k.pizza.clone()],
                ingredients: vec![k.flour.clone(), k.cheese.clone()],
                overrides: Vec::new(),
            },
        );
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();

        assert_eq!(plan.total_recipes, 1);
        assert!(plan.warnings.contains(&PlanWarning::ServingsOverflow {
            recipe_id: crumbs.id,
            recipe_name: "Bread Crumb".to_string(),
        }));
        // Only pizza's $5000 share: 500 servings, 2 lb flour per 8.
        assert_eq!(find(&plan, k.flour.id).recommended_quantity, 125.0);
    }

    #[test]
    fn estimated_servings_bounds() {
        assert_eq!(estimated_servings(100.0, 12.0), Some(9));
        assert_eq!(estimated_servings(-5.0, 12.0), Some(0));
        assert_eq!(estimated_servings(1e12, 1e-3), None);
    }

    #[test]
    fn flat_history_is_fully_confident() {
        let (k, source) = kitchen();
        let plan = planner(source)
            .plan_prep(k.location, today() + Days::new(1), 0.0)
            .unwrap();
        assert_eq!(plan.confidence_level, 100);
    }

    #[test]
    fn ceil_tenth_rounds_up_and_ignores_noise() {
        assert_eq!(ceil_tenth(6.25), 6.3);
        assert_eq!(ceil_tenth(2.3), 2.3);
        assert_eq!(ceil_tenth(0.1 + 0.2), 0.3);
        assert_eq!(ceil_tenth(0.0), 0.0);
        assert_eq!(ceil_tenth(0.01), 0.1);
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let w = PlanWarning::RecipeSkipped {
            recipe_id: RecipeId::new(),
            recipe_name: "Soup".to_string(),
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "recipeSkipped");
        assert_eq!(json["recipeName"], "Soup");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: sorted output, buffer invariant, contributions sum to the recommendation.
        #[test]
        fn recommendations_respect_invariants(
            daily in 200.0f64..20_000.0,
            pct in 0.0f64..=50.0,
            quantities in prop::collection::vec(0.0f64..50.0, 1..6),
            days_out in 1u64..=30,
        ) {
            let location = LocationId::new();
            let ingredients: Vec<IngredientDefinition> = quantities
                .iter()
                .enumerate()
                .map(|(i, _)| IngredientDefinition::new(IngredientId::new(), format!("ing-{i}"), "lb", 1.0))
                .collect();
            let a = quantities.iter().zip(&ingredients).fold(
                RecipeDefinition::new(RecipeId::new(), "A").with_servings(6).with_selling_price(13.0),
                |r, (q, ing)| r.with_line(RecipeIngredientLine::new(ing.id, *q, "oz")),
            );
            let b = quantities.iter().zip(&ingredients).fold(
                RecipeDefinition::new(RecipeId::new(), "B").with_servings(3).with_selling_price(9.5),
                |r, (q, ing)| r.with_line(RecipeIngredientLine::new(ing.id, *q / 2.0, "lb")),
            );
            let source = InMemoryPlanningData::new().with_location(location, LocationData {
                history: flat_history(daily),
                recipes: vec![a, b],
                ingredients,
                overrides: Vec::new(),
            });

            let plan = planner(source)
                .plan_prep(location, today() + Days::new(days_out), pct)
                .unwrap();

            for pair in plan.recommendations.windows(2) {
                prop_assert!(pair[0].total_with_buffer >= pair[1].total_with_buffer);
            }
            for r in &plan.recommendations {
                prop_assert!((r.total_with_buffer - (r.recommended_quantity + r.safety_buffer)).abs() <= 0.1 + 1e-9);
                let contributed: f64 = r.recipes.iter().map(|c| c.ingredient_quantity).sum();
                prop_assert!((contributed - r.recommended_quantity).abs() <= 0.1 + 0.01 * r.recipes.len() as f64);
            }
        }
    }
}
