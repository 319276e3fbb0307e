//! Planning error model.

use thiserror::Error;

/// Result type used across the planning layer.
pub type PlanningResult<T> = Result<T, PlanningError>;

/// Fatal planning error.
///
/// These halt the specific planning operation. Recoverable per-line problems
/// (unit conversion failures) are reported as warnings on the result instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// Not enough qualifying sales history to forecast from.
    #[error("insufficient historical data: found {found} records, need at least {required}")]
    InsufficientHistoricalData { found: usize, required: usize },

    /// A prep target date is in the past, today, or beyond the planning horizon.
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    /// A day count is outside its allowed range.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl PlanningError {
    pub fn insufficient_history(found: usize, required: usize) -> Self {
        Self::InsufficientHistoricalData { found, required }
    }

    pub fn invalid_date_range(msg: impl Into<String>) -> Self {
        Self::InvalidDateRange(msg.into())
    }

    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
