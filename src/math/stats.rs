//! Weighted estimators over masked series.
//!
//! Every estimator first drops positions that are masked in any input, then
//! renormalises the remaining weights to sum to one:
//!
//! ```text
//! mean_w(x) = Σ w_i x_i / Σ w_i        (i over unmasked positions)
//! ```
//!
//! Score normalisation maps a raw error `e` to `exp(-|e| / σ_obs)`, where
//! `σ_obs` is the weighted standard deviation of the observations over the
//! same positions. A perfect match scores 1 and the score decays towards 0 as
//! the error grows relative to the observed spread.

use nalgebra::DVector;

use crate::domain::Normalize;
use crate::error::{ConfrontError, Result};

/// Unmasked `(model, obs)` pairs and their weights.
struct Pairs {
    model: DVector<f64>,
    obs: DVector<f64>,
    weights: DVector<f64>,
}

impl Pairs {
    fn collect(model: &[Option<f64>], obs: &[Option<f64>], weights: &[f64]) -> Result<Self> {
        if model.len() != obs.len() || model.len() != weights.len() {
            return Err(ConfrontError::DimensionMismatch {
                model: model.len(),
                obs: obs.len(),
                weights: weights.len(),
            });
        }

        let mut m = Vec::with_capacity(model.len());
        let mut o = Vec::with_capacity(model.len());
        let mut w = Vec::with_capacity(model.len());
        for ((mv, ov), &wv) in model.iter().zip(obs).zip(weights) {
            if let (Some(mv), Some(ov)) = (mv, ov) {
                m.push(*mv);
                o.push(*ov);
                w.push(wv);
            }
        }

        let total: f64 = w.iter().sum();
        if w.is_empty() || total <= 0.0 {
            return Err(ConfrontError::EmptySeries(
                "no position is unmasked in both model and observations".to_string(),
            ));
        }

        Ok(Self {
            model: DVector::from_vec(m),
            obs: DVector::from_vec(o),
            weights: DVector::from_vec(w) / total,
        })
    }

    fn diff(&self) -> DVector<f64> {
        &self.model - &self.obs
    }

    fn obs_spread(&self) -> f64 {
        let mean = self.weights.dot(&self.obs);
        let centered = self.obs.add_scalar(-mean);
        self.weights.dot(&centered.component_mul(&centered)).sqrt()
    }
}

/// Weighted mean of the unmasked values.
pub fn weighted_mean(values: &[Option<f64>], weights: &[f64]) -> Result<f64> {
    let (x, w) = compact(values, weights)?;
    Ok(w.dot(&x))
}

/// Weighted (population) standard deviation of the unmasked values.
pub fn weighted_std(values: &[Option<f64>], weights: &[f64]) -> Result<f64> {
    let (x, w) = compact(values, weights)?;
    let centered = x.add_scalar(-w.dot(&x));
    Ok(w.dot(&centered.component_mul(&centered)).sqrt())
}

/// Population standard deviation (`ddof = 0`); `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let x = DVector::from_column_slice(values);
    let centered = x.add_scalar(-x.mean());
    Some((centered.norm_squared() / values.len() as f64).sqrt())
}

/// Weighted mean of `model - obs`.
pub fn bias(model: &[Option<f64>], obs: &[Option<f64>], weights: &[f64], normalize: Normalize) -> Result<f64> {
    let pairs = Pairs::collect(model, obs, weights)?;
    let raw = pairs.weights.dot(&pairs.diff());
    normalized(raw, &pairs, normalize, "bias")
}

/// Weighted root-mean-square of `model - obs`.
pub fn rmse(model: &[Option<f64>], obs: &[Option<f64>], weights: &[f64], normalize: Normalize) -> Result<f64> {
    let pairs = Pairs::collect(model, obs, weights)?;
    let d = pairs.diff();
    let raw = pairs.weights.dot(&d.component_mul(&d)).sqrt();
    normalized(raw, &pairs, normalize, "rmse")
}

fn normalized(raw: f64, pairs: &Pairs, normalize: Normalize, what: &str) -> Result<f64> {
    match normalize {
        Normalize::None => Ok(raw),
        Normalize::Score => {
            if raw == 0.0 {
                return Ok(1.0);
            }
            let spread = pairs.obs_spread();
            if !(spread.is_finite() && spread > 0.0) {
                return Err(ConfrontError::DegenerateVariance(format!(
                    "observations used for the {what} score"
                )));
            }
            Ok((-raw.abs() / spread).exp())
        }
    }
}

fn compact(values: &[Option<f64>], weights: &[f64]) -> Result<(DVector<f64>, DVector<f64>)> {
    if values.len() != weights.len() {
        return Err(ConfrontError::DimensionMismatch {
            model: values.len(),
            obs: values.len(),
            weights: weights.len(),
        });
    }
    let (x, w): (Vec<f64>, Vec<f64>) = values
        .iter()
        .zip(weights)
        .filter_map(|(v, &w)| v.map(|v| (v, w)))
        .unzip();
    let total: f64 = w.iter().sum();
    if x.is_empty() || total <= 0.0 {
        return Err(ConfrontError::EmptySeries("every value is masked".to_string()));
    }
    Ok((DVector::from_vec(x), DVector::from_vec(w) / total))
}
