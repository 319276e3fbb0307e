use core::str::FromStr;

use serde::{Deserialize, Serialize};

use kitchenplan_forecasting::ForecastConfig;

/// Planner limits and heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Furthest target date, in days after today.
    pub max_horizon_days: u32,
    pub max_safety_buffer_percent: f64,
    pub max_consolidation_days: u32,
    /// Assumed over-prep percentage without planning; basis of the waste estimate.
    pub waste_baseline_percent: f64,
    pub forecast: ForecastConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_horizon_days: 30,
            max_safety_buffer_percent: 50.0,
            max_consolidation_days: 30,
            waste_baseline_percent: 30.0,
            forecast: ForecastConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by `KITCHENPLAN_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(days) = env_parse("KITCHENPLAN_MAX_HORIZON_DAYS") {
            config.max_horizon_days = days;
        }
        if let Some(days) = env_parse("KITCHENPLAN_MAX_CONSOLIDATION_DAYS") {
            config.max_consolidation_days = days;
        }
        if let Some(days) = env_parse("KITCHENPLAN_HISTORY_WINDOW_DAYS") {
            config.forecast.history_window_days = days;
        }
        if let Some(records) = env_parse("KITCHENPLAN_MIN_HISTORY_RECORDS") {
            config.forecast.min_history_records = records;
        }
        config
    }

    pub fn with_forecast(mut self, forecast: ForecastConfig) -> Self {
        self.forecast = forecast;
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}
