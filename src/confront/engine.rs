//! The confrontation itself.
//!
//! Given a model result:
//! 1. request the model series over the observation extent (padded)
//! 2. narrow to what the model actually covers
//! 3. take the matching observation window in the same unit
//! 4. check that the two time axes line up
//! 5. reduce vertical profiles to a near-surface series
//! 6. compute weighted metrics and the interannual variability score

use log::{debug, info, warn};

use crate::confront::align::validate_alignment;
use crate::confront::profile::reduce_profile;
use crate::domain::{
    ConfrontSettings, MetricReport, Metrics, ModelValues, Normalize, SeriesReport, SkippedMetric, validate_times,
};
use crate::error::{ConfrontError, Result};
use crate::math::{annual_min_max, bias, interannual_variability_score, monthly_weights, rmse, weighted_mean};
use crate::model::{ModelSource, PointRequest};
use crate::obs::ObservationStore;

/// A reusable confrontation against one observation site.
#[derive(Debug)]
pub struct Confrontation {
    store: ObservationStore,
    settings: ConfrontSettings,
}

impl Confrontation {
    pub fn new(store: ObservationStore, settings: ConfrontSettings) -> Self {
        Self { store, settings }
    }

    /// Compare `model` with the observations and return the metric report.
    pub fn confront(&self, model: &dyn ModelSource) -> Result<MetricReport> {
        let s = &self.settings;

        let (obs_min, obs_max) = self
            .store
            .time_extent()
            .ok_or_else(|| ConfrontError::EmptySeries("observation record is empty".to_string()))?;

        let request = PointRequest {
            variable: s.variable.clone(),
            site: self.store.site(),
            start: obs_min - s.padding_days,
            end: obs_max + s.padding_days,
            alternates: s.alternates.clone(),
            output_unit: s.output_unit.clone(),
        };
        let extracted = model.extract_point_time_series(&request)?;
        validate_times(&extracted.times, extracted.values.len())?;
        extracted.values.validate()?;

        // Might be less model data than observations.
        let (t0, tf) = match (extracted.times.first(), extracted.times.last()) {
            (Some(&t0), Some(&tf)) => (t0, tf),
            _ => {
                return Err(ConfrontError::EmptySeries(format!(
                    "model has no '{}' samples in [{:.1}, {:.1}]",
                    s.variable, request.start, request.end
                )));
            }
        };

        let obs = self.store.get_window(t0, tf, Some(s.output_unit.as_str()))?;
        validate_alignment(&extracted.times, &obs.t, s.alignment_tolerance)?;

        let model_values = match &extracted.values {
            ModelValues::Surface(v) => v.clone(),
            ModelValues::Profile(rows) => {
                debug!(
                    "{}: averaging {} layer(s) of a {}-level profile",
                    s.name,
                    self.store.nlayers(),
                    rows.first().map_or(0, Vec::len)
                );
                reduce_profile(rows, self.store.nlayers())?
            }
        };

        let weights = monthly_weights(&extracted.times);
        let mut skipped = Vec::new();

        let period_mean = weighted_mean(&model_values, &weights)?;
        let monthly_mean_bias = bias(&model_values, &obs.var, &weights, Normalize::None)?;
        let monthly_mean_rmse = rmse(&model_values, &obs.var, &weights, Normalize::None)?;
        let monthly_mean_bias_score = score(
            "MonthlyMeanBiasScore",
            bias(&model_values, &obs.var, &weights, Normalize::Score),
            &mut skipped,
        )?;
        let monthly_mean_rmse_score = score(
            "MonthlyMeanRMSEScore",
            rmse(&model_values, &obs.var, &weights, Normalize::Score),
            &mut skipped,
        )?;

        let model_annual = annual_min_max(&extracted.times, &model_values)?;
        let obs_annual = annual_min_max(&obs.t, &obs.var)?;
        let interannual_variability_score = score(
            "InterannualVariabilityScore",
            interannual_variability_score(&model_annual, &obs_annual),
            &mut skipped,
        )?;

        info!(
            "{}: {} samples over [{t0:.1}, {tf:.1}], bias={monthly_mean_bias:.4}, rmse={monthly_mean_rmse:.4}",
            s.name,
            extracted.times.len()
        );

        Ok(MetricReport {
            model: SeriesReport {
                t: extracted.times,
                var: model_values,
                unit: extracted.unit,
            },
            obs,
            metric: Metrics {
                period_mean,
                monthly_mean_bias,
                monthly_mean_bias_score,
                monthly_mean_rmse,
                monthly_mean_rmse_score,
                interannual_variability_score,
            },
            skipped,
        })
    }
}

/// A score that cannot be formed because the observations have no spread is
/// reported as absent; every other failure propagates.
fn score(metric: &str, result: Result<f64>, skipped: &mut Vec<SkippedMetric>) -> Result<Option<f64>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(err @ ConfrontError::DegenerateVariance(_)) => {
            warn!("{metric} not computed: {err}");
            skipped.push(SkippedMetric {
                metric: metric.to_string(),
                reason: err.to_string(),
            });
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
