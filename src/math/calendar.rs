//! Fixed 365-day ("no-leap") calendar anchored at 1850-01-01.
//!
//! The reference dataset expresses time as `(fractional_year - 1850) * 365`,
//! so every year is exactly 365 days and February always has 28 days.

use chrono::NaiveDate;

pub const EPOCH_YEAR: i32 = 1850;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Days in each month of the no-leap calendar.
pub const DAYS_PER_MONTH: [f64; 12] = [
    31.0, 28.0, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0,
];

/// Day of year at which each month begins.
const MONTH_START: [f64; 12] = [
    0.0, 31.0, 59.0, 90.0, 120.0, 151.0, 181.0, 212.0, 243.0, 273.0, 304.0, 334.0,
];

/// Calendar year containing day offset `t`.
pub fn year_of(t: f64) -> i32 {
    EPOCH_YEAR + (t / DAYS_PER_YEAR).floor() as i32
}

/// Day within the year, in `[0, 365)`.
pub fn day_of_year(t: f64) -> f64 {
    t.rem_euclid(DAYS_PER_YEAR)
}

/// Zero-based month index (0 = January) containing day offset `t`.
pub fn month_index(t: f64) -> usize {
    let doy = day_of_year(t);
    MONTH_START.partition_point(|&start| start <= doy).saturating_sub(1)
}

/// Number of days in the month containing `t`.
pub fn days_in_month(t: f64) -> f64 {
    DAYS_PER_MONTH[month_index(t)]
}

/// Day offset of the start of month `month` (0-based) in `year`.
pub fn month_start(year: i32, month: usize) -> f64 {
    f64::from(year - EPOCH_YEAR) * DAYS_PER_YEAR + MONTH_START[month.min(11)]
}

/// Convert a fractional year (e.g. `1958.2027`) to a day offset.
pub fn from_fractional_year(year: f64) -> f64 {
    (year - f64::from(EPOCH_YEAR)) * DAYS_PER_YEAR
}

/// Label a day offset with the (proleptic Gregorian) date of the same
/// year/month/day.
pub fn to_date(t: f64) -> Option<NaiveDate> {
    let month = month_index(t);
    let day = (day_of_year(t) - MONTH_START[month]).floor() as u32 + 1;
    NaiveDate::from_ymd_opt(year_of(t), month as u32 + 1, day)
}
