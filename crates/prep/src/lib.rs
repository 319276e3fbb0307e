//! Prep planning.
//!
//! Turns a forecasted day's revenue into per-recipe servings and per-ingredient
//! quantities (in each ingredient's storage unit, plus a safety buffer), and
//! consolidates several days into a single shopping view.
//!
//! Per-line unit problems never abort a plan: they are reported as
//! [`PlanWarning`]s alongside the recommendations.

pub mod config;
pub mod costing;
pub mod mix;
pub mod multi_day;
pub mod plan;
pub mod source;

pub use config::PlannerConfig;
pub use costing::{LineCost, RecipeCost, cost_recipe};
pub use mix::{FixedSalesMix, SalesMixStrategy, UniformSalesMix};
pub use multi_day::{DailySummary, DayBreakdown, MultiDayIngredient, MultiDayPrepPlan, merge_daily_plans};
pub use plan::{PlanWarning, PrepPlanResult, PrepPlanner, PrepRecommendation, RecipeContribution};
pub use source::{InMemoryPlanningData, LocationData, PlanningDataSource, PlanningInputs};
