//! Seasonal-plus-trend revenue model, forecast points and backtest accuracy.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use kitchenplan_core::{PlanningError, PlanningResult};

use crate::config::ForecastConfig;
use crate::history::{HistoricalSalesRecord, day_index, qualifying};
use crate::insights;
use crate::stats::{mape, mean, ols_slope, rmse, round_to, stddev_population};

/// One forecasted day.
///
/// Invariant: `0 <= confidence_lower <= predicted_revenue <= confidence_upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_revenue: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub day_of_week: u8,
}

impl ForecastPoint {
    pub fn interval_width(&self) -> f64 {
        self.confidence_upper - self.confidence_lower
    }
}

/// Backtest accuracy over the holdout slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub forecasts: Vec<ForecastPoint>,
    pub accuracy: AccuracyReport,
    pub insights: Vec<String>,
}

/// Day-of-week baseline + linear trend derived from a qualifying history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalTrendModel {
    /// Mean revenue per weekday (0 = Sunday). Zero where no observations exist.
    pub baseline: [f64; 7],
    /// Population standard deviation per weekday.
    pub stddev: [f64; 7],
    /// Dollars per day; may be negative.
    pub trend_per_day: f64,
    /// Mean of all qualifying daily totals.
    pub historical_average: f64,
    pub records_used: usize,
}

impl SeasonalTrendModel {
    /// Build the model from records already windowed and sorted oldest first.
    pub fn from_records(records: &[HistoricalSalesRecord], trend_window: usize) -> Self {
        let mut by_day: [Vec<f64>; 7] = Default::default();
        for r in records {
            by_day[r.weekday()].push(r.total_sales);
        }

        let baseline = core::array::from_fn(|d| mean(&by_day[d]));
        let stddev = core::array::from_fn(|d| stddev_population(&by_day[d]));

        let recent_start = records.len().saturating_sub(trend_window);
        let recent: Vec<f64> = records[recent_start..].iter().map(|r| r.total_sales).collect();
        let totals: Vec<f64> = records.iter().map(|r| r.total_sales).collect();

        Self {
            baseline,
            stddev,
            trend_per_day: ols_slope(&recent),
            historical_average: mean(&totals),
            records_used: records.len(),
        }
    }

    /// Forecast `date`, `days_out` days after the reference date.
    pub fn point(&self, date: NaiveDate, days_out: u32, z: f64) -> ForecastPoint {
        let dow = day_index(date);
        let d = usize::from(dow);
        let predicted = (self.baseline[d] + self.trend_per_day * f64::from(days_out)).max(0.0);
        let margin = self.stddev[d] * z;

        ForecastPoint {
            date,
            predicted_revenue: round_to(predicted, 2),
            confidence_lower: round_to((predicted - margin).max(0.0), 2),
            confidence_upper: round_to(predicted + margin, 2),
            day_of_week: dow,
        }
    }

    /// Predict each holdout record with `baseline + trend * index_within_holdout`.
    pub fn backtest(&self, holdout: &[HistoricalSalesRecord]) -> AccuracyReport {
        let actual: Vec<f64> = holdout.iter().map(|r| r.total_sales).collect();
        let predicted: Vec<f64> = holdout
            .iter()
            .enumerate()
            .map(|(i, r)| self.baseline[r.weekday()] + self.trend_per_day * i as f64)
            .collect();

        AccuracyReport {
            mape: round_to(mape(&actual, &predicted), 2),
            rmse: round_to(rmse(&actual, &predicted), 2),
        }
    }
}

/// Produces dated revenue forecasts from daily sales history.
#[derive(Debug, Clone, Default)]
pub struct RevenueForecaster {
    config: ForecastConfig,
}

impl RevenueForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Window the history and build the model.
    ///
    /// Fails with `InsufficientHistoricalData` when fewer than
    /// `min_history_records` qualify; there is no fallback.
    pub fn model(
        &self,
        history: &[HistoricalSalesRecord],
        today: NaiveDate,
    ) -> PlanningResult<(SeasonalTrendModel, Vec<HistoricalSalesRecord>)> {
        let records = qualifying(history, today, self.config.history_window_days);
        if records.len() < self.config.min_history_records {
            return Err(PlanningError::insufficient_history(
                records.len(),
                self.config.min_history_records,
            ));
        }
        let model = SeasonalTrendModel::from_records(&records, self.config.trend_window);
        Ok((model, records))
    }

    /// Forecast the `days_ahead` days following `today`.
    pub fn forecast(
        &self,
        history: &[HistoricalSalesRecord],
        today: NaiveDate,
        days_ahead: u32,
    ) -> PlanningResult<ForecastResult> {
        if days_ahead == 0 {
            return Err(PlanningError::validation("days_ahead must be at least 1"));
        }

        let (model, records) = self.model(history, today)?;

        let mut forecasts = Vec::with_capacity(days_ahead as usize);
        for i in 1..=days_ahead {
            let date = today
                .checked_add_days(Days::new(u64::from(i)))
                .ok_or_else(|| PlanningError::invalid_date_range("forecast date out of range"))?;
            forecasts.push(model.point(date, i, self.config.confidence_z));
        }

        let holdout_start = records.len().saturating_sub(self.config.holdout_size);
        let accuracy = model.backtest(&records[holdout_start..]);
        let insights = insights::describe(&model, &forecasts, &self.config);

        tracing::debug!(
            records = model.records_used,
            trend_per_day = model.trend_per_day,
            days_ahead,
            mape = accuracy.mape,
            "revenue forecast produced"
        );

        Ok(ForecastResult {
            forecasts,
            accuracy,
            insights,
        })
    }
}
