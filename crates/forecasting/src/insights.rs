//! Plain-language statements about a forecast.

use crate::config::ForecastConfig;
use crate::engine::{ForecastPoint, SeasonalTrendModel};
use crate::history::day_name;
use crate::stats::mean;

/// Trend, peak day, and (when notable) forecast-vs-history deviation.
pub(crate) fn describe(
    model: &SeasonalTrendModel,
    forecasts: &[ForecastPoint],
    config: &ForecastConfig,
) -> Vec<String> {
    let mut insights = Vec::with_capacity(3);

    let trend = model.trend_per_day;
    insights.push(if trend > config.trend_threshold {
        format!("Sales are trending upward by ${trend:.2} per day.")
    } else if trend < -config.trend_threshold {
        format!("Sales are trending downward by ${:.2} per day.", trend.abs())
    } else {
        "Sales have been stable over recent weeks.".to_string()
    });

    if let Some((day, average)) = peak_day(&model.baseline) {
        insights.push(format!(
            "{} is typically the busiest day, averaging ${average:.2} in sales.",
            day_name(day)
        ));
    }

    let predicted: Vec<f64> = forecasts.iter().map(|p| p.predicted_revenue).collect();
    if !predicted.is_empty() && model.historical_average > 0.0 {
        let change = (mean(&predicted) - model.historical_average) / model.historical_average * 100.0;
        if change > config.deviation_threshold_percent {
            insights.push(format!(
                "Forecasted sales are {change:.1}% above the recent daily average."
            ));
        } else if change < -config.deviation_threshold_percent {
            insights.push(format!(
                "Forecasted sales are {:.1}% below the recent daily average.",
                change.abs()
            ));
        }
    }

    insights
}

/// Weekday with the highest positive baseline; earliest weekday wins ties.
fn peak_day(baseline: &[f64; 7]) -> Option<(u8, f64)> {
    let mut best: Option<(u8, f64)> = None;
    for (day, value) in baseline.iter().copied().enumerate() {
        if value > best.map_or(0.0, |(_, v)| v) {
            best = Some((day as u8, value));
        }
    }
    best
}
