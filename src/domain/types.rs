//! Shared domain types.
//!
//! Series values are `Option<f64>`: `None` is a masked sample that carries no
//! magnitude and is skipped by every reduction. Report types are serializable
//! so the CLI can emit them as JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfrontError, Result};

/// An ordered `(time, value)` sequence.
///
/// Times are days since 1850-01-01 in the fixed 365-day calendar and are
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub times: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Build a series, validating lengths, time ordering and finite values.
    pub fn new(times: Vec<f64>, values: Vec<Option<f64>>) -> Result<Self> {
        validate_times(&times, values.len())?;
        validate_values(&values)?;
        Ok(Self { times, values })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `(first, last)` time, or `None` for an empty series.
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Number of unmasked samples.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Check that `times` is finite, non-decreasing, and `expected_len` long.
pub fn validate_times(times: &[f64], expected_len: usize) -> Result<()> {
    if times.len() != expected_len {
        return Err(ConfrontError::InvalidSeries(format!(
            "{} times but {} values",
            times.len(),
            expected_len
        )));
    }
    if let Some(bad) = times.iter().position(|t| !t.is_finite()) {
        return Err(ConfrontError::InvalidSeries(format!("non-finite time at index {bad}")));
    }
    if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
        return Err(ConfrontError::InvalidSeries(format!(
            "times decrease at index {} ({} -> {})",
            i + 1,
            times[i],
            times[i + 1]
        )));
    }
    Ok(())
}

/// Masking is expressed with `None`; a present value must be finite.
pub fn validate_values(values: &[Option<f64>]) -> Result<()> {
    match values.iter().position(|v| v.is_some_and(|x| !x.is_finite())) {
        Some(bad) => Err(ConfrontError::InvalidSeries(format!("non-finite value at index {bad}"))),
        None => Ok(()),
    }
}

/// Values a model reports at a site: one per time, or one per layer per time.
///
/// For profiles, each row is a time step and row element 0 is the top layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValues {
    Surface(Vec<Option<f64>>),
    Profile(Vec<Vec<Option<f64>>>),
}

impl ModelValues {
    /// Number of time steps.
    pub fn len(&self) -> usize {
        match self {
            ModelValues::Surface(v) => v.len(),
            ModelValues::Profile(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject unmasked values that are not finite.
    pub fn validate(&self) -> Result<()> {
        match self {
            ModelValues::Surface(v) => validate_values(v),
            ModelValues::Profile(rows) => rows.iter().try_for_each(|r| validate_values(r)),
        }
    }

    /// Keep only the time steps whose index satisfies `keep`.
    pub fn select(&self, keep: impl Fn(usize) -> bool) -> ModelValues {
        match self {
            ModelValues::Surface(v) => ModelValues::Surface(
                v.iter().enumerate().filter(|(i, _)| keep(*i)).map(|(_, x)| *x).collect(),
            ),
            ModelValues::Profile(rows) => ModelValues::Profile(
                rows.iter()
                    .enumerate()
                    .filter(|(i, _)| keep(*i))
                    .map(|(_, r)| r.clone())
                    .collect(),
            ),
        }
    }

    /// Multiply every unmasked value by `factor`.
    pub fn scaled(&self, factor: f64) -> ModelValues {
        let scale = |v: &Option<f64>| v.map(|x| x * factor);
        match self {
            ModelValues::Surface(v) => ModelValues::Surface(v.iter().map(scale).collect()),
            ModelValues::Profile(rows) => {
                ModelValues::Profile(rows.iter().map(|r| r.iter().map(scale).collect()).collect())
            }
        }
    }
}

/// A model series as returned by the extraction collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSeries {
    pub times: Vec<f64>,
    pub values: ModelValues,
    pub unit: String,
}

/// Geographic location of an observation site (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub lat: f64,
    pub lon: f64,
}

/// The reference dataset: series, its unit, site, and layer count.
///
/// `nlayers` is how many near-surface layers to average when a model reports
/// a vertical profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub series: TimeSeries,
    pub unit: String,
    pub site: Site,
    pub nlayers: usize,
}

/// A series together with the unit its values are expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub t: Vec<f64>,
    pub var: Vec<Option<f64>>,
    pub unit: String,
}

/// Scalar results of one confrontation.
///
/// Scores are `None` when they could not be computed; the reason is listed in
/// `MetricReport::skipped`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(rename = "PeriodMean")]
    pub period_mean: f64,
    #[serde(rename = "MonthlyMeanBias")]
    pub monthly_mean_bias: f64,
    #[serde(rename = "MonthlyMeanBiasScore")]
    pub monthly_mean_bias_score: Option<f64>,
    #[serde(rename = "MonthlyMeanRMSE")]
    pub monthly_mean_rmse: f64,
    #[serde(rename = "MonthlyMeanRMSEScore")]
    pub monthly_mean_rmse_score: Option<f64>,
    #[serde(rename = "InterannualVariabilityScore")]
    pub interannual_variability_score: Option<f64>,
}

/// A metric that was left out of the report, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMetric {
    pub metric: String,
    pub reason: String,
}

/// Output of a confrontation: the series actually compared plus the metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub model: SeriesReport,
    pub obs: SeriesReport,
    pub metric: Metrics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedMetric>,
}

/// Minimum and maximum of the unmasked values of one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualAmplitude {
    pub year: i32,
    pub min: f64,
    pub max: f64,
}

impl AnnualAmplitude {
    pub fn amplitude(&self) -> f64 {
        self.max - self.min
    }
}

/// Whether an estimator returns its raw value or a `[0, 1]` score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalize {
    #[default]
    None,
    Score,
}

/// Knobs of the confrontation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfrontSettings {
    /// Name used in logs and summaries.
    pub name: String,
    /// Primary model variable name.
    pub variable: String,
    /// Names the model collaborator may fall back to, in order.
    pub alternates: Vec<String>,
    /// Unit both series are compared in.
    pub output_unit: String,
    /// Days added on both sides of the observation extent for the model request.
    pub padding_days: f64,
    /// Maximum allowed distance (days) between paired model/obs times.
    pub alignment_tolerance: f64,
}

impl Default for ConfrontSettings {
    fn default() -> Self {
        Self {
            name: "CO2MaunaLoa".to_string(),
            variable: "co2".to_string(),
            alternates: vec!["co2mass".to_string()],
            output_unit: "1e-6".to_string(),
            padding_days: 5.0,
            alignment_tolerance: 15.0,
        }
    }
}

/// A full `confront run` configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub obs_path: PathBuf,
    pub model_path: PathBuf,
    pub header_skip: usize,
    pub time_column: usize,
    pub value_column: usize,
    pub obs_unit: String,
    pub site: Site,
    pub nlayers: usize,
    pub settings: ConfrontSettings,
    pub json: bool,
}

/// Configuration of the synthetic `confront demo` run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub start_year: i32,
    pub years: usize,
    pub seed: u64,
    /// Constant offset added to the model (ppm).
    pub bias: f64,
    /// Multiplier applied to the model's seasonal amplitude.
    pub amplitude_scale: f64,
    /// Observation noise standard deviation (ppm).
    pub noise: f64,
    /// Number of model layers; 0 reports a surface series.
    pub layers: usize,
    /// Leading layers masked at every time step.
    pub masked_top_layers: usize,
    pub nlayers: usize,
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_series_rejects_decreasing_times() {
        let err = TimeSeries::new(vec![0.0, 31.0, 30.0], vec![Some(1.0); 3]).unwrap_err();
        assert!(matches!(err, ConfrontError::InvalidSeries(_)));
    }

    #[test]
    fn time_series_accepts_repeated_times() {
        let s = TimeSeries::new(vec![0.0, 0.0, 31.0], vec![Some(1.0), None, Some(2.0)]).unwrap();
        assert_eq!(s.valid_count(), 2);
        assert_eq!(s.time_extent(), Some((0.0, 31.0)));
    }

    #[test]
    fn time_series_rejects_nan_values() {
        let err = TimeSeries::new(vec![0.0, 31.0], vec![Some(1.0), Some(f64::NAN)]).unwrap_err();
        assert!(matches!(err, ConfrontError::InvalidSeries(_)));
        assert!(TimeSeries::new(vec![0.0, 31.0], vec![Some(1.0), None]).is_ok());
    }

    #[test]
    fn profile_values_must_be_finite() {
        let v = ModelValues::Profile(vec![vec![None, Some(1.0)], vec![Some(f64::INFINITY), Some(2.0)]]);
        assert!(matches!(v.validate(), Err(ConfrontError::InvalidSeries(_))));
        assert!(ModelValues::Surface(vec![Some(1.0), None]).validate().is_ok());
    }

    #[test]
    fn metrics_serialize_with_report_names() {
        let m = Metrics {
            period_mean: 1.0,
            monthly_mean_bias: 0.5,
            monthly_mean_bias_score: Some(0.9),
            monthly_mean_rmse: 0.7,
            monthly_mean_rmse_score: Some(0.8),
            interannual_variability_score: None,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["MonthlyMeanRMSE"], 0.7);
        assert_eq!(json["MonthlyMeanBiasScore"], 0.9);
        assert!(json["InterannualVariabilityScore"].is_null());
    }

    #[test]
    fn model_values_select_keeps_profile_rows() {
        let v = ModelValues::Profile(vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(3.0)]]);
        let kept = v.select(|i| i != 1);
        assert_eq!(kept, ModelValues::Profile(vec![vec![Some(1.0)], vec![Some(3.0)]]));
    }
}
