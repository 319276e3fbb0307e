//! Historical sales input.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Day-of-week index, 0 = Sunday … 6 = Saturday.
pub fn day_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// English name for a day-of-week index (wraps modulo 7).
pub fn day_name(index: u8) -> &'static str {
    DAY_NAMES[usize::from(index % 7)]
}

/// One location's revenue for one day. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSalesRecord {
    pub date: NaiveDate,
    pub total_sales: f64,
    pub day_of_week: u8,
}

impl HistoricalSalesRecord {
    pub fn new(date: NaiveDate, total_sales: f64) -> Self {
        Self {
            date,
            total_sales,
            day_of_week: day_index(date),
        }
    }

    /// Weekday derived from `date`; the stored field is informational.
    pub fn weekday(&self) -> usize {
        usize::from(day_index(self.date))
    }
}

/// Records dated in `[today - window_days, today)` with finite sales, oldest first.
pub(crate) fn qualifying(
    history: &[HistoricalSalesRecord],
    today: NaiveDate,
    window_days: u32,
) -> Vec<HistoricalSalesRecord> {
    let start = today - chrono::Days::new(u64::from(window_days));
    let mut records: Vec<HistoricalSalesRecord> = history
        .iter()
        .filter(|r| r.date >= start && r.date < today && r.total_sales.is_finite())
        .cloned()
        .collect();
    records.sort_by_key(|r| r.date);
    records
}
