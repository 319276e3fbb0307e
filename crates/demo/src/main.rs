//! Seeds one in-memory location and prints a forecast, a prep plan for
//! tomorrow and a consolidated multi-day plan as JSON.

use anyhow::Context;
use chrono::Days;
use serde::Serialize;

use kitchenplan_catalog::{
    ConversionOverride, IngredientDefinition, RecipeDefinition, RecipeIngredientLine,
};
use kitchenplan_core::{Clock, IngredientId, LocationId, RecipeId, SystemClock};
use kitchenplan_forecasting::{
    ForecastResult, HistoricalSalesRecord, RevenueForecaster, day_index,
};
use kitchenplan_prep::{
    InMemoryPlanningData, LocationData, MultiDayPrepPlan, PlannerConfig, PlanningDataSource,
    PrepPlanResult, PrepPlanner, RecipeCost, cost_recipe,
};
use kitchenplan_units::Unit;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    forecast: ForecastResult,
    recipe_costs: Vec<RecipeCost>,
    tomorrow: PrepPlanResult,
    multi_day: MultiDayPrepPlan,
}

fn main() -> anyhow::Result<()> {
    kitchenplan_observability::init();

    let buffer_percent = env_or("KITCHENPLAN_DEMO_BUFFER_PERCENT", 15.0)?;
    let days = env_or("KITCHENPLAN_DEMO_DAYS", 7u32)?;

    let config = PlannerConfig::from_env();
    let today = SystemClock.today();
    let location = LocationId::new();
    let source = InMemoryPlanningData::new().with_location(location, seed(today));

    let inputs = source.load(location)?;
    let forecast = RevenueForecaster::new(config.forecast.clone())
        .forecast(&inputs.history, today, days)
        .context("forecasting demo location")?;
    let recipe_costs = inputs
        .catalog
        .recipes()
        .iter()
        .map(|r| cost_recipe(r, &inputs.catalog))
        .collect();

    let planner = PrepPlanner::with_config(source, config);
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .context("date overflow")?;
    let plan = planner.plan_prep(location, tomorrow, buffer_percent)?;
    let multi_day = planner.consolidate(location, tomorrow, days, buffer_percent)?;

    let report = Report {
        forecast,
        recipe_costs,
        tomorrow: plan,
        multi_day,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: core::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number (got {raw:?})")),
        Err(_) => {
            tracing::debug!(key, "not set; using default");
            Ok(default)
        }
    }
}

/// Eight weeks of bistro sales and a small menu.
fn seed(today: chrono::NaiveDate) -> LocationData {
    let history = (1..=56u64)
        .filter_map(|back| Some((back, today.checked_sub_days(Days::new(back))?)))
        .map(|(back, date)| {
            let base = match day_index(date) {
                5 | 6 => 5200.0,
                0 => 4100.0,
                1 => 2100.0,
                _ => 2900.0,
            };
            // Slow upward drift toward today.
            let drift = (56 - back) as f64 * 3.0;
            HistoricalSalesRecord::new(date, base + drift)
        })
        .collect();

    let onions = IngredientDefinition::new(IngredientId::new(), "Yellow Onions", "lb", 0.95)
        .with_piece_weight_oz(8.0);
    let butter = IngredientDefinition::new(IngredientId::new(), "Butter", "lb", 4.2);
    let stock = IngredientDefinition::new(IngredientId::new(), "Beef Stock", "gal", 11.0);
    let baguette = IngredientDefinition::new(IngredientId::new(), "Baguette", "each", 2.1);
    let gruyere = IngredientDefinition::new(IngredientId::new(), "Gruyère", "lb", 14.5);
    let mussels = IngredientDefinition::new(IngredientId::new(), "Mussels", "lb", 5.75);
    let white_wine = IngredientDefinition::new(IngredientId::new(), "White Wine", "L", 9.0);
    let parsley = IngredientDefinition::new(IngredientId::new(), "Parsley", "oz", 0.6);

    let soup = RecipeDefinition::new(RecipeId::new(), "French Onion Soup")
        .with_servings(10)
        .with_selling_price(11.0)
        .with_line(RecipeIngredientLine::new(onions.id, 12.0, "pc"))
        .with_line(RecipeIngredientLine::new(butter.id, 4.0, "oz"))
        .with_line(RecipeIngredientLine::new(stock.id, 3.0, "qt"))
        .with_line(RecipeIngredientLine::new(baguette.id, 1.0, "each"))
        .with_line(RecipeIngredientLine::new(gruyere.id, 300.0, "g"));
    let moules = RecipeDefinition::new(RecipeId::new(), "Moules Frites")
        .with_servings(4)
        .with_selling_price(24.0)
        .with_line(RecipeIngredientLine::new(mussels.id, 4.0, "lb"))
        .with_line(RecipeIngredientLine::new(white_wine.id, 2.0, "cup"))
        .with_line(RecipeIngredientLine::new(butter.id, 2.0, "tbsp"))
        .with_line(RecipeIngredientLine::new(parsley.id, 1.0, "bunch"));
    let tartine = RecipeDefinition::new(RecipeId::new(), "Mushroom Tartine")
        .with_servings(6)
        .with_selling_price(14.0)
        .with_line(RecipeIngredientLine::new(baguette.id, 2.0, "each"))
        .with_line(RecipeIngredientLine::new(gruyere.id, 6.0, "oz"))
        .with_line(RecipeIngredientLine::new(parsley.id, 0.5, "bunch"));

    LocationData {
        history,
        recipes: vec![soup, moules, tartine],
        overrides: vec![
            ConversionOverride::new(parsley.id, Unit::parse("bunch"), Unit::Ounce, 2.0)
                .with_notes("curly parsley, stems on"),
        ],
        ingredients: vec![onions, butter, stock, baguette, gruyere, mussels, white_wine, parsley],
    }
}
