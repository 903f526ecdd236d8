//! Calendar-month sample weights.
//!
//! Monthly means cover months of 28 to 31 days; weighting each sample by the
//! length of its month keeps February from counting as much as January.

use crate::math::calendar::{DAYS_PER_YEAR, days_in_month};

/// Weight of each sample: days in its calendar month over days in the year.
pub fn monthly_weights(times: &[f64]) -> Vec<f64> {
    times.iter().map(|&t| days_in_month(t) / DAYS_PER_YEAR).collect()
}
