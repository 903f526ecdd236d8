//! Annual amplitudes and the interannual variability score.

use std::collections::BTreeMap;

use crate::domain::AnnualAmplitude;
use crate::error::{ConfrontError, Result};
use crate::math::calendar::year_of;
use crate::math::stats::population_std;

/// Per calendar year, the min and max of the unmasked values.
///
/// Years without any unmasked sample produce no entry; partial years use
/// whatever samples they have. Output is ordered by year.
pub fn annual_min_max(times: &[f64], values: &[Option<f64>]) -> Result<Vec<AnnualAmplitude>> {
    if times.len() != values.len() {
        return Err(ConfrontError::InvalidSeries(format!(
            "{} times but {} values",
            times.len(),
            values.len()
        )));
    }

    let mut by_year: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for (&t, v) in times.iter().zip(values) {
        let Some(v) = *v else { continue };
        by_year
            .entry(year_of(t))
            .and_modify(|(lo, hi)| {
                *lo = lo.min(v);
                *hi = hi.max(v);
            })
            .or_insert((v, v));
    }

    Ok(by_year
        .into_iter()
        .map(|(year, (min, max))| AnnualAmplitude { year, min, max })
        .collect())
}

/// `max(0, 1 - |σm - σo| / σo)` over the annual amplitudes of the years
/// present in both inputs.
pub fn interannual_variability_score(model: &[AnnualAmplitude], obs: &[AnnualAmplitude]) -> Result<f64> {
    let obs_by_year: BTreeMap<i32, f64> = obs.iter().map(|a| (a.year, a.amplitude())).collect();

    let (model_amp, obs_amp): (Vec<f64>, Vec<f64>) = model
        .iter()
        .filter_map(|m| obs_by_year.get(&m.year).map(|&o| (m.amplitude(), o)))
        .unzip();

    let (Some(std_model), Some(std_obs)) = (population_std(&model_amp), population_std(&obs_amp)) else {
        return Err(ConfrontError::EmptySeries(
            "model and observations share no calendar year".to_string(),
        ));
    };

    if !(std_obs.is_finite() && std_obs > 0.0) {
        return Err(ConfrontError::DegenerateVariance(format!(
            "observed annual amplitude over {} paired year(s)",
            obs_amp.len()
        )));
    }

    Ok((1.0 - ((std_model - std_obs) / std_obs).abs()).max(0.0))
}
