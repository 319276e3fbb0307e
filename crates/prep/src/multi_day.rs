//! Multi-day consolidation.
//!
//! Each day in the range is planned independently from the same loaded inputs,
//! then [`merge_daily_plans`] folds the per-day results into one shopping view.
//! The buffer is recomputed once on each multi-day total, never summed per day.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use kitchenplan_catalog::Catalog;
use kitchenplan_core::{IngredientId, LocationId, PlanningError, PlanningResult};
use kitchenplan_units::Unit;

use crate::plan::{
    PlanWarning, PrepPlanResult, PrepPlanner, RecipeContribution, ceil_tenth, round_to,
    waste_reduction,
};
use crate::source::{PlanningDataSource, PlanningInputs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    pub date: NaiveDate,
    /// That day's recommended quantity, before buffer.
    pub quantity: f64,
    pub recipes: Vec<RecipeContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiDayIngredient {
    pub ingredient_id: IngredientId,
    pub ingredient_name: String,
    pub unit: Unit,
    pub total_quantity_all_days: f64,
    pub safety_buffer: f64,
    pub total_with_buffer: f64,
    /// Whole pieces to buy, when the ingredient is stored by weight and has a piece weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_count: Option<u32>,
    /// `None` when the ingredient's unit cost is unusable.
    pub estimated_cost: Option<f64>,
    pub day_breakdowns: Vec<DayBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub forecast_revenue: f64,
    pub confidence_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiDayPrepPlan {
    pub location_id: LocationId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub safety_buffer_percent: f64,
    /// Sorted by `total_with_buffer`, largest first.
    pub ingredients: Vec<MultiDayIngredient>,
    pub daily: Vec<DailySummary>,
    pub total_forecast_revenue: f64,
    pub average_daily_revenue: f64,
    pub total_ingredients: usize,
    pub estimated_waste_reduction: i64,
    pub estimated_total_cost: f64,
    /// Distinct warnings across all days, first occurrence order.
    pub warnings: Vec<PlanWarning>,
}

impl<S: PlanningDataSource> PrepPlanner<S> {
    /// Plan `days` consecutive days starting at `start_date` and consolidate.
    ///
    /// Errors: `InvalidRange` when `days` is outside `1..=max_consolidation_days`;
    /// any per-day planning error fails the whole consolidation.
    #[tracing::instrument(skip(self))]
    pub fn consolidate(
        &self,
        location_id: LocationId,
        start_date: NaiveDate,
        days: u32,
        safety_buffer_percent: f64,
    ) -> PlanningResult<MultiDayPrepPlan> {
        let max = self.config().max_consolidation_days;
        if days == 0 || days > max {
            return Err(PlanningError::invalid_range(format!(
                "days must be between 1 and {max} (got {days})"
            )));
        }
        self.validate_buffer(safety_buffer_percent)?;

        let dates: Vec<NaiveDate> = (0..days)
            .map(|offset| {
                start_date
                    .checked_add_days(Days::new(u64::from(offset)))
                    .ok_or_else(|| PlanningError::invalid_date_range("date range overflows the calendar"))
            })
            .collect::<PlanningResult<_>>()?;

        let inputs = self.source().load(location_id)?;
        let today = self.today();
        let daily = self
            .plan_days(&inputs, location_id, today, &dates, safety_buffer_percent)
            .into_iter()
            .collect::<PlanningResult<Vec<_>>>()?;

        let plan = merge_daily_plans(
            location_id,
            &daily,
            &inputs.catalog,
            safety_buffer_percent,
            self.config().waste_baseline_percent,
        );

        tracing::info!(
            %location_id,
            %start_date,
            days,
            ingredients = plan.total_ingredients,
            total_forecast_revenue = plan.total_forecast_revenue,
            "multi-day prep plan produced"
        );
        Ok(plan)
    }

    #[cfg(not(feature = "parallel"))]
    fn plan_days(
        &self,
        inputs: &PlanningInputs,
        location_id: LocationId,
        today: NaiveDate,
        dates: &[NaiveDate],
        safety_buffer_percent: f64,
    ) -> Vec<PlanningResult<PrepPlanResult>> {
        dates
            .iter()
            .map(|date| self.plan_for_day(inputs, location_id, today, *date, safety_buffer_percent))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn plan_days(
        &self,
        inputs: &PlanningInputs,
        location_id: LocationId,
        today: NaiveDate,
        dates: &[NaiveDate],
        safety_buffer_percent: f64,
    ) -> Vec<PlanningResult<PrepPlanResult>> {
        use rayon::prelude::*;

        // Indexed collect keeps date order, so the merge sees the same sequence.
        dates
            .par_iter()
            .map(|date| self.plan_for_day(inputs, location_id, today, *date, safety_buffer_percent))
            .collect()
    }
}

/// Fold per-day plans (in date order) into a single multi-day plan.
///
/// Pure: the same daily plans always yield the same result.
pub fn merge_daily_plans(
    location_id: LocationId,
    daily: &[PrepPlanResult],
    catalog: &Catalog,
    safety_buffer_percent: f64,
    waste_baseline_percent: f64,
) -> MultiDayPrepPlan {
    let mut order: Vec<IngredientId> = Vec::new();
    let mut merged: HashMap<IngredientId, MultiDayIngredient> = HashMap::new();
    let mut warnings: Vec<PlanWarning> = Vec::new();

    for day in daily {
        for rec in &day.recommendations {
            let entry = merged.entry(rec.ingredient_id).or_insert_with(|| {
                order.push(rec.ingredient_id);
                MultiDayIngredient {
                    ingredient_id: rec.ingredient_id,
                    ingredient_name: rec.ingredient_name.clone(),
                    unit: rec.unit.clone(),
                    total_quantity_all_days: 0.0,
                    safety_buffer: 0.0,
                    total_with_buffer: 0.0,
                    piece_count: None,
                    estimated_cost: None,
                    day_breakdowns: Vec::new(),
                }
            });
            entry.total_quantity_all_days += rec.recommended_quantity;
            entry.day_breakdowns.push(DayBreakdown {
                date: day.target_date,
                quantity: rec.recommended_quantity,
                recipes: rec.recipes.clone(),
            });
        }
        for w in &day.warnings {
            if !warnings.contains(w) {
                warnings.push(w.clone());
            }
        }
    }

    let mut ingredients: Vec<MultiDayIngredient> = order
        .into_iter()
        .filter_map(|id| merged.remove(&id))
        .map(|mut item| {
            let total = round_to(item.total_quantity_all_days, 1);
            let buffer_raw = total * safety_buffer_percent / 100.0;
            item.total_quantity_all_days = total;
            item.safety_buffer = ceil_tenth(buffer_raw);
            item.total_with_buffer = ceil_tenth(total + buffer_raw);

            if let Some(ingredient) = catalog.ingredient(item.ingredient_id) {
                item.piece_count = piece_count(item.total_with_buffer, &item.unit, ingredient.piece_weight_oz);
                item.estimated_cost = ingredient
                    .unit_cost()
                    .map(|c| round_to(item.total_with_buffer * c, 2));
            }
            item
        })
        .collect();

    ingredients.sort_by(|a, b| b.total_with_buffer.total_cmp(&a.total_with_buffer));

    let total_forecast_revenue: f64 = daily.iter().map(|d| d.forecast_revenue).sum();
    let days = daily.len();
    let average_daily_revenue = if days == 0 {
        0.0
    } else {
        total_forecast_revenue / days as f64
    };

    MultiDayPrepPlan {
        location_id,
        start_date: daily.first().map(|d| d.target_date).unwrap_or_default(),
        end_date: daily.last().map(|d| d.target_date).unwrap_or_default(),
        days: days as u32,
        safety_buffer_percent,
        total_ingredients: ingredients.len(),
        estimated_total_cost: round_to(ingredients.iter().filter_map(|i| i.estimated_cost).sum(), 2),
        ingredients,
        daily: daily
            .iter()
            .map(|d| DailySummary {
                date: d.target_date,
                forecast_revenue: d.forecast_revenue,
                confidence_level: d.confidence_level,
            })
            .collect(),
        total_forecast_revenue: round_to(total_forecast_revenue, 2),
        average_daily_revenue: round_to(average_daily_revenue, 2),
        estimated_waste_reduction: waste_reduction(safety_buffer_percent, waste_baseline_percent),
        warnings,
    }
}

/// Pieces needed to cover a weight stored in oz or lb, rounded up.
fn piece_count(quantity: f64, unit: &Unit, piece_weight_oz: Option<f64>) -> Option<u32> {
    let weight = piece_weight_oz.filter(|w| w.is_finite() && *w > 0.0)?;
    let ounces = match unit {
        Unit::Ounce => quantity,
        Unit::Pound => quantity * 16.0,
        _ => return None,
    };
    Some((ounces / weight - 1e-9).ceil().max(0.0) as u32)
}
