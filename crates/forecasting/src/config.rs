use serde::{Deserialize, Serialize};

/// Tuning knobs for [`crate::RevenueForecaster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastConfig {
    /// Trailing window (days before today) that qualifies history.
    pub history_window_days: u32,
    /// Minimum qualifying records required to forecast.
    pub min_history_records: usize,
    /// Number of most recent records used for the trend slope.
    pub trend_window: usize,
    /// Number of most recent records held out for the accuracy backtest.
    pub holdout_size: usize,
    /// z value for the confidence band (1.96 ≈ 95%).
    pub confidence_z: f64,
    /// $/day beyond which the trend is reported as upward/downward.
    pub trend_threshold: f64,
    /// Percent deviation of forecast vs history that earns an insight.
    pub deviation_threshold_percent: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_window_days: 90,
            min_history_records: 14,
            trend_window: 30,
            holdout_size: 7,
            confidence_z: 1.96,
            trend_threshold: 10.0,
            deviation_threshold_percent: 5.0,
        }
    }
}

impl ForecastConfig {
    pub fn with_history_window_days(mut self, days: u32) -> Self {
        self.history_window_days = days;
        self
    }

    pub fn with_min_history_records(mut self, records: usize) -> Self {
        self.min_history_records = records;
        self
    }

    pub fn with_trend_window(mut self, records: usize) -> Self {
        self.trend_window = records;
        self
    }

    pub fn with_holdout_size(mut self, records: usize) -> Self {
        self.holdout_size = records;
        self
    }

    pub fn with_confidence_z(mut self, z: f64) -> Self {
        self.confidence_z = z;
        self
    }

    pub fn with_trend_threshold(mut self, dollars_per_day: f64) -> Self {
        self.trend_threshold = dollars_per_day;
        self
    }

    pub fn with_deviation_threshold_percent(mut self, percent: f64) -> Self {
        self.deviation_threshold_percent = percent;
        self
    }
}
