//! Revenue forecasting.
//!
//! Model:
//! - Seasonal component: average revenue per day of week over the trailing window.
//! - Trend component: least-squares slope over the most recent records.
//! - Confidence band: per-weekday population standard deviation times a z value.
//!
//! Deterministic and side-effect free; callers supply the history and "today".

pub mod config;
pub mod engine;
pub mod history;
pub mod insights;
pub mod stats;

pub use config::ForecastConfig;
pub use engine::{AccuracyReport, ForecastPoint, ForecastResult, RevenueForecaster, SeasonalTrendModel};
pub use history::{HistoricalSalesRecord, day_index, day_name};
